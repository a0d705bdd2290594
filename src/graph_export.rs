//! Component graph export for visualization tooling.
//!
//! Turns a normalized [`Component`] into a serializable node/edge structure,
//! with JSON output for web UIs and DOT output for Graphviz. Edges reflect
//! declared signatures; assisted parameters are caller-supplied and carry no
//! edge.

use std::collections::HashMap;

use serde::Serialize;

use crate::binding::BindingKind;
use crate::component::Component;
use crate::error::{DiError, DiResult};
use crate::key::Key;

/// One binding, multibinding contribution, or unsatisfied requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Node id; edges refer to these
    pub id: usize,
    /// Display name of the bound type
    pub type_name: &'static str,
    /// "class", "instance", "provider", "factory", or "requirement"
    pub kind: &'static str,
    /// Whether the node is a multibinding contribution
    pub multibinding: bool,
}

/// A declared dependency: `from` requires `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
}

/// Exportable snapshot of a component's shape.
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::graph_export::GraphExport;
/// use wirebox::ComponentBuilder;
///
/// let component = ComponentBuilder::new()
///     .bind_instance(Arc::new(1u32))
///     .register_provider(|n: Arc<u32>| Some(n.to_string()))
///     .finalize()
///     .unwrap();
///
/// let export = GraphExport::from_component(&component);
/// assert_eq!(export.nodes.len(), 2);
/// assert_eq!(export.edges.len(), 1);
/// let json = export.to_json().unwrap();
/// assert!(json.contains("u32"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn kind_str(kind: BindingKind) -> &'static str {
    match kind {
        BindingKind::Class => "class",
        BindingKind::Instance => "instance",
        BindingKind::Provider => "provider",
        BindingKind::Factory => "factory",
    }
}

impl GraphExport {
    /// Snapshots the component. Partial components get a dashed
    /// "requirement" node per unsatisfied requirement, so the holes are
    /// visible in the rendered graph.
    pub fn from_component(component: &Component) -> Self {
        let descriptors = component.descriptors();
        let mut nodes = Vec::with_capacity(descriptors.len());
        let mut regular: HashMap<Key, usize> = HashMap::new();
        for (id, d) in descriptors.iter().enumerate() {
            if !d.multibinding {
                regular.insert(d.key, id);
            }
            nodes.push(GraphNode {
                id,
                type_name: d.type_name(),
                kind: kind_str(d.kind),
                multibinding: d.multibinding,
            });
        }

        let mut requirement_ids: HashMap<Key, usize> = HashMap::new();
        for key in component.requirements() {
            let id = nodes.len();
            requirement_ids.insert(key, id);
            nodes.push(GraphNode {
                id,
                type_name: key.display_name(),
                kind: "requirement",
                multibinding: false,
            });
        }

        let mut edges = Vec::new();
        for (id, d) in descriptors.iter().enumerate() {
            for dep in &d.required {
                let target = regular
                    .get(dep)
                    .or_else(|| requirement_ids.get(dep))
                    .copied();
                if let Some(to) = target {
                    edges.push(GraphEdge { from: id, to });
                }
            }
        }

        Self { nodes, edges }
    }

    pub fn to_json(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|_| DiError::TypeMismatch("graph JSON serialization"))
    }

    /// DOT source for Graphviz. Multibinding contributions render as
    /// ellipses, requirements as dashed boxes.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph component {\n");
        out.push_str("  rankdir=TB;\n");
        for node in &self.nodes {
            let shape = if node.multibinding { "ellipse" } else { "box" };
            let style = if node.kind == "requirement" {
                ", style=dashed"
            } else {
                ""
            };
            out.push_str(&format!(
                "  n{} [label=\"{}\\n({})\", shape={}{}];\n",
                node.id, node.type_name, node.kind, shape, style
            ));
        }
        for edge in &self.edges {
            out.push_str(&format!("  n{} -> n{};\n", edge.from, edge.to));
        }
        out.push_str("}\n");
        out
    }
}
