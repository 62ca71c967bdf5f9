use ace_ui_graphics::{Point, Rect};
use indexmap::IndexSet;

use crate::tree::NodeTree;
use crate::{NodeId, PipelineId};

/// Tag strings used by the framework's own nodes.
pub mod tags {
    pub const ROOT: &str = "root";
    pub const STAGE: &str = "stage";
    pub const PAGE: &str = "page";
    pub const IF_ELSE: &str = "IfElse";
    pub const FOR_EACH: &str = "ForEach";
    pub const JS_VIEW: &str = "JsView";
    pub const COLUMN: &str = "Column";
    pub const STACK: &str = "Stack";
    pub const TEXT: &str = "Text";
    pub const TEXT_INPUT: &str = "TextInput";
    pub const SHEET_PAGE: &str = "SheetPage";
    pub const SHEET_MASK: &str = "SheetMask";
    pub const POPUP: &str = "Popup";
    pub const OVERLAY: &str = "overlay";
}

/// Whether a node belongs to a detached builder subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeStatus {
    #[default]
    NormalNode,
    BuilderNodeOffMainTree,
    BuilderNodeOnMainTree,
}

impl NodeStatus {
    pub fn is_builder(self) -> bool {
        self != NodeStatus::NormalNode
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Invisible,
    Gone,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Geometry is whatever was last assigned.
    #[default]
    Fixed,
    /// Geometry fills the nearest frame ancestor.
    MatchParent,
}

/// Render-side state of a frame node.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderState {
    pub translate: Point,
    pub opacity: f32,
    /// An exit transition is running; removal waits for it.
    pub has_transition_out: bool,
    /// A default appear transition was requested by the last attach.
    pub appear_transition_pending: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            translate: Point::ZERO,
            opacity: 1.0,
            has_transition_out: false,
            appear_transition_pending: false,
        }
    }
}

/// Geometry-bearing node payload.
#[derive(Clone, Debug)]
pub struct FrameData {
    pub geometry: Rect,
    pub layout_policy: LayoutPolicy,
    pub visibility: Visibility,
    /// Input events are delivered to this node.
    pub enabled: bool,
    pub active: bool,
    /// Starts an exit transition when detached without `recursive`.
    pub disappear_transition: bool,
    /// Shared-element identity; a node carrying one stays alive on pending
    /// removal until the transition settles.
    pub geometry_transition: Option<String>,
    pub render: RenderState,
    pub(crate) needs_sync_render_tree: bool,
    pub(crate) render_children: Vec<NodeId>,
}

impl Default for FrameData {
    fn default() -> Self {
        Self {
            geometry: Rect::default(),
            layout_policy: LayoutPolicy::Fixed,
            visibility: Visibility::Visible,
            enabled: true,
            active: true,
            disappear_transition: false,
            geometry_transition: None,
            render: RenderState::default(),
            needs_sync_render_tree: false,
            render_children: Vec::new(),
        }
    }
}

impl FrameData {
    pub fn needs_sync_render_tree(&self) -> bool {
        self.needs_sync_render_tree
    }

    pub fn render_children(&self) -> &[NodeId] {
        &self.render_children
    }
}

pub type BuildFn = Box<dyn FnOnce(&mut NodeTree, NodeId) + 'static>;

/// User-defined component whose children come from a build closure.
#[derive(Default)]
pub struct CustomData {
    pub(crate) build: Option<BuildFn>,
    pub(crate) built: bool,
}

impl CustomData {
    pub fn is_built(&self) -> bool {
        self.built
    }
}

impl std::fmt::Debug for CustomData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomData")
            .field("pending_build", &self.build.is_some())
            .field("built", &self.built)
            .finish()
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Frame(FrameData),
    Custom(CustomData),
    /// Control-flow node such as `IfElse` or `ForEach`.
    Syntax,
    Generic,
}

impl NodeKind {
    pub fn frame() -> Self {
        NodeKind::Frame(FrameData::default())
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, NodeKind::Frame(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Frame(_) => "frame",
            NodeKind::Custom(_) => "custom",
            NodeKind::Syntax => "syntax",
            NodeKind::Generic => "generic",
        }
    }
}

/// Child parked while its exit transition runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisappearingChild {
    pub node: NodeId,
    /// Slot it occupied in the live children when removed.
    pub index: usize,
}

/// A vertex of the node tree.
#[derive(Debug)]
pub struct UiNode {
    pub(crate) id: NodeId,
    pub(crate) accessibility_id: u64,
    pub(crate) tag: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: u32,
    pub(crate) children: IndexSet<NodeId>,
    pub(crate) disappearing_children: Vec<DisappearingChild>,
    pub(crate) is_disappearing: bool,
    pub(crate) on_main_tree: bool,
    pub(crate) is_removing: bool,
    pub(crate) status: NodeStatus,
    pub(crate) context: Option<PipelineId>,
    pub(crate) modal_children: u32,
    pub(crate) is_modal_child: bool,
    pub(crate) retain_count: u32,
    pub(crate) observe_lifecycle: bool,
}

impl UiNode {
    pub(crate) fn new(id: NodeId, accessibility_id: u64, tag: String, kind: NodeKind) -> Self {
        Self {
            id,
            accessibility_id,
            tag,
            kind,
            parent: None,
            depth: 0,
            children: IndexSet::new(),
            disappearing_children: Vec::new(),
            is_disappearing: false,
            on_main_tree: false,
            is_removing: false,
            status: NodeStatus::NormalNode,
            context: None,
            modal_children: 0,
            is_modal_child: false,
            retain_count: 0,
            observe_lifecycle: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn accessibility_id(&self) -> u64 {
        self.accessibility_id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn disappearing_children(&self) -> &[DisappearingChild] {
        &self.disappearing_children
    }

    pub fn is_disappearing(&self) -> bool {
        self.is_disappearing
    }

    pub fn is_on_main_tree(&self) -> bool {
        self.on_main_tree
    }

    pub fn is_removing(&self) -> bool {
        self.is_removing
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn context(&self) -> Option<PipelineId> {
        self.context
    }

    pub fn is_modal_child(&self) -> bool {
        self.is_modal_child
    }

    pub fn has_modal_child(&self) -> bool {
        self.modal_children > 0
    }

    pub fn frame(&self) -> Option<&FrameData> {
        match &self.kind {
            NodeKind::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub(crate) fn frame_mut(&mut self) -> Option<&mut FrameData> {
        match &mut self.kind {
            NodeKind::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn is_frame(&self) -> bool {
        self.kind.is_frame()
    }
}

/// Notifications about observed nodes, drained by whoever owns the node's
/// higher-level state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    Attached(NodeId),
    Detached(NodeId),
    Destroyed(NodeId),
}
