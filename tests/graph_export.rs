#![cfg(feature = "graph-export")]

use std::sync::Arc;

use wirebox::{ComponentBuilder, GraphExport};

struct Config;

struct Store {
    _config: Arc<Config>,
}

fn sample_component() -> wirebox::Component {
    ComponentBuilder::new()
        .bind_instance(Arc::new(Config))
        .register_provider(|config: Arc<Config>| Some(Store { _config: config }))
        .add_multibinding_provider(|| Some(7u32))
        .finalize()
        .unwrap()
}

#[test]
fn test_export_lists_every_binding() {
    let export = GraphExport::from_component(&sample_component());

    assert_eq!(export.nodes.len(), 3);
    assert!(export.nodes[0].type_name.ends_with("Config"));
    assert!(export.nodes[1].type_name.ends_with("Store"));
    assert_eq!(export.nodes[2].type_name, "u32");
    assert!(export.nodes[2].multibinding);
}

#[test]
fn test_export_edges_follow_requirements() {
    let export = GraphExport::from_component(&sample_component());

    // Store -> Config is the only dependency edge.
    assert_eq!(export.edges.len(), 1);
    assert_eq!(export.edges[0].from, 1);
    assert_eq!(export.edges[0].to, 0);
}

#[test]
fn test_unsatisfied_requirements_become_placeholder_nodes() {
    let partial = ComponentBuilder::new()
        .register_provider(|missing: Arc<String>| Some(missing.len() as u64))
        .finalize_partial()
        .unwrap();
    let export = GraphExport::from_component(&partial);

    assert_eq!(export.nodes.len(), 2);
    let placeholder = &export.nodes[1];
    assert_eq!(placeholder.kind, "requirement");
    assert_eq!(placeholder.type_name, "alloc::string::String");
    assert_eq!(export.edges, vec![wirebox::GraphEdge { from: 0, to: 1 }]);
}

#[test]
fn test_json_round_trips_through_serde() {
    let export = GraphExport::from_component(&sample_component());
    let json = export.to_json().unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(parsed["edges"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["nodes"][2]["multibinding"], true);
}

#[test]
fn test_dot_names_every_node() {
    let export = GraphExport::from_component(&sample_component());
    let dot = export.to_dot();

    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("Config"));
    assert!(dot.contains("Store"));
    assert!(dot.contains("u32"));
    assert!(dot.contains("->"));
}
