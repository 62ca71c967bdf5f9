use ace_core::NodeId;

/// Caret of the focused text input, in root coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusedInput {
    pub node: NodeId,
    pub caret_top: f32,
    pub caret_height: f32,
}

/// Tracks which text input owns focus so keyboard avoidance can keep its
/// caret visible.
#[derive(Debug, Default)]
pub struct TextFieldManager {
    focused: Option<FocusedInput>,
}

impl TextFieldManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focused(&mut self, node: NodeId, caret_top: f32, caret_height: f32) {
        self.focused = Some(FocusedInput {
            node,
            caret_top,
            caret_height,
        });
    }

    /// Only clears focus still held by `node`.
    pub fn clear_focus(&mut self, node: NodeId) -> bool {
        if self.focused.is_some_and(|input| input.node == node) {
            self.focused = None;
            return true;
        }
        false
    }

    pub fn focused(&self) -> Option<FocusedInput> {
        self.focused
    }

    pub fn focused_node(&self) -> Option<NodeId> {
        self.focused.map(|input| input.node)
    }
}
