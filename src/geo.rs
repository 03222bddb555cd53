//! Great-circle distance between WGS84 points.

/// Mean Earth radius in kilometres, as used throughout the bike-network core.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between `(lat1, lon1)` and `(lat2, lon2)`, in kilometres.
///
/// Inputs are decimal degrees. Always non-negative; exactly `0.0` for
/// identical endpoints.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
