use bikecch::shp_utils::{load_edges, load_nodes, segments_from_shapefiles};

#[test]
fn test_load_edges() {
    if let Ok(edges) = load_edges(&"data/beijing/edges.shp") {
        if !edges.is_empty() {
            println!("Loaded {} edges. Showing first 10:", edges.len());
            for (i, e) in edges.iter().take(10).enumerate() {
                println!(
                    "Edge[{i}]: fid={} u={} v={} len={} highway={:?} name={:?} oneway={:?} maxspeed={:?}",
                    e.fid, e.u, e.v, e.length, e.highway, e.name, e.oneway, e.maxspeed
                );
            }
        } else {
            println!("No edges loaded (file missing?)");
        }
    }
}

#[test]
fn test_load_nodes() {
    match load_nodes(&"data/beijing/nodes.shp") {
        Ok(nodes) => {
            if !nodes.is_empty() {
                println!("Loaded {} nodes. Showing first 10:", nodes.len());
                for (i, n) in nodes.iter().take(10).enumerate() {
                    println!(
                        "Node[{i}]: osmid={} x={:.6} y={:.6} highway={:?} ref={:?}",
                        n.osmid, n.x, n.y, n.highway, n.r#ref
                    );
                }
            } else {
                println!("No nodes loaded (file missing or no point geometries)");
            }
        }
        Err(e) => println!("Failed to load nodes: {e}"),
    }
}

#[test]
fn test_segments_from_shapefiles_feed_the_builder() {
    let nodes = match load_nodes(&"data/beijing/nodes.shp") {
        Ok(v) => v,
        Err(e) => {
            println!("Failed to load nodes: {e}");
            return;
        }
    };
    let edges = match load_edges(&"data/beijing/edges.shp") {
        Ok(v) => v,
        Err(e) => {
            println!("Failed to load edges: {e}");
            return;
        }
    };

    let segments = segments_from_shapefiles(&nodes, &edges);
    println!("Joined {} road segments from {} edges.", segments.len(), edges.len());

    let (graph, skipped) = bikecch::GraphBuilder::build(segments);
    println!(
        "Built graph with {} vertices, {} segments skipped for missing endpoints.",
        graph.len_vertices(),
        skipped.len()
    );
}
