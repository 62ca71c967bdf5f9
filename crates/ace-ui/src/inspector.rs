//! Snapshots of the node tree for inspector tooling.
//!
//! Disappearing children are listed after the live ones and flagged.

use ace_core::{NodeId, NodeTree};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorNode {
    pub id: NodeId,
    pub accessibility_id: u64,
    pub tag: String,
    /// `frame`, `custom`, `syntax` or `generic`.
    pub kind: String,
    pub depth: u32,
    pub on_main_tree: bool,
    pub disappearing: bool,
    /// `[x, y, width, height]` of frame nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default)]
    pub children: Vec<InspectorNode>,
}

pub fn inspect(tree: &NodeTree, root: NodeId) -> Option<InspectorNode> {
    let node = tree.node(root)?;
    let frame = node.frame();
    let mut children: Vec<InspectorNode> = node
        .children()
        .filter_map(|child| inspect(tree, child))
        .collect();
    children.extend(
        node.disappearing_children()
            .iter()
            .filter_map(|entry| inspect(tree, entry.node)),
    );
    Some(InspectorNode {
        id: root,
        accessibility_id: node.accessibility_id(),
        tag: node.tag().to_owned(),
        kind: node.kind().name().to_owned(),
        depth: node.depth(),
        on_main_tree: node.is_on_main_tree(),
        disappearing: node.is_disappearing(),
        rect: frame.map(|frame| {
            let rect = frame.geometry;
            [rect.x, rect.y, rect.width, rect.height]
        }),
        visibility: frame.map(|frame| format!("{:?}", frame.visibility)),
        children,
    })
}

/// JSON form of the subtree at `root`; `null` when it does not exist.
pub fn dump_tree_json(tree: &NodeTree, root: NodeId) -> serde_json::Value {
    match inspect(tree, root) {
        Some(node) => serde_json::to_value(node).unwrap_or_default(),
        None => serde_json::Value::Null,
    }
}

/// One line per node, indented by depth below `root`.
pub fn dump_tree_text(tree: &NodeTree, root: NodeId) -> String {
    let mut output = String::new();
    match inspect(tree, root) {
        Some(node) => dump_node(&mut output, &node, 0),
        None => output.push_str(&format!("[{root}] (missing)\n")),
    }
    output
}

fn dump_node(output: &mut String, node: &InspectorNode, depth: usize) {
    let indent = "  ".repeat(depth);
    output.push_str(&format!("{indent}[{}] {}", node.id, node.tag));
    if let Some([x, y, width, height]) = node.rect {
        output.push_str(&format!(" ({x}, {y}, {width}x{height})"));
    }
    if node.disappearing {
        output.push_str(" disappearing");
    }
    output.push('\n');
    for child in &node.children {
        dump_node(output, child, depth + 1);
    }
}
