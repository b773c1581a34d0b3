//! Drag model: source/target classifications and the shared drag record.
//!
//! `DragState` is the one live description of the gesture in flight. It is
//! owned by [`crate::session::DragSession`]; controllers and the classifier
//! read and write it only through the session, and the resolver receives a
//! snapshot of it on release.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::geom::Point;
use crate::model::Container;
use crate::surface::ElementId;

/// Where the dragged element comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    #[default]
    None,
    /// The chat application's own conversation list.
    HostPage,
    /// A conversation row inside one of our folders.
    Folder,
    /// A row of the standalone (unfiled) list.
    Standalone,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// What lies under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetKind {
    #[default]
    None,
    Conversation,
    FolderHeader,
    RootArea,
}

/// Refinement of a target: which side of a row, or into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPosition {
    #[default]
    None,
    Before,
    After,
    Inside,
}

/// Handle to the container a drag started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    /// An enclosing folder container element and its folder id.
    Folder { element: ElementId, folder_id: String },
    /// The extension's root list (standalone rows).
    RootList(ElementId),
    /// The element's parent on the host page.
    Parent(ElementId),
}

impl ContainerRef {
    /// The store container this handle maps to, if any.
    #[must_use]
    pub fn container(&self) -> Option<Container> {
        match self {
            Self::Folder { folder_id, .. } => Some(Container::Folder(folder_id.clone())),
            Self::RootList(_) => Some(Container::Standalone),
            Self::Parent(_) => None,
        }
    }
}

/// The currently hovered drop target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DropTarget {
    pub target: Option<ElementId>,
    pub kind: TargetKind,
    pub position: DropPosition,
    /// Conversation id of a conversation target.
    pub conversation_id: Option<String>,
    /// Enclosing folder of a conversation target, or the header's folder.
    pub folder_id: Option<String>,
    /// Enclosing folder container element (header highlight).
    pub folder_element: Option<ElementId>,
    /// Re-render scope for a drop here.
    pub render_scope: Option<ElementId>,
}

impl DropTarget {
    /// Whether nothing valid is hovered.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.kind == TargetKind::None || self.target.is_none()
    }
}

/// Gesture sub-state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// Waiting for a press.
    #[default]
    Idle,
    /// Pressed, below the movement threshold.
    Armed,
    /// Past the threshold; the indicator follows the cursor.
    Dragging,
    /// Released; the indicator is animating out.
    Settling,
}

/// The shared drag record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub source_kind: SourceKind,
    /// Element the press landed on.
    pub dragged_element: Option<ElementId>,
    /// Conversation id derived from that element.
    pub dragged_element_id: Option<String>,
    pub source_container: Option<ContainerRef>,
    pub cursor_start: Point,
    pub cursor_current: Point,
    pub potential_drop_target: DropTarget,
}

impl DragState {
    /// Back to the empty record.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Distance travelled since the press.
    #[must_use]
    pub fn travel(&self) -> f64 {
        self.cursor_start.distance_to(self.cursor_current)
    }
}
