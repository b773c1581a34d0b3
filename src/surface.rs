//! Host surface capabilities the drag engine reads from.
//!
//! SYSTEM CONTEXT
//! ==============
//! The engine never touches the DOM. The host layer exposes the rendered
//! element populations, per-element info (attributes, text, nearest folder
//! container), and a spatial index of drop candidates (bounding boxes plus
//! type tags). Writes flow the other way as [`crate::session::Action`]s.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::BTreeMap;

use crate::consts::{CONVERSATION_ID_ATTR, CONVERSATION_TITLE_ATTR, FOLDER_ID_ATTR, HREF_ATTR};
use crate::drag::SourceKind;
use crate::geom::Rect;

/// Opaque handle to an element, assigned by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// What kind of element was pressed, as far as drag eligibility goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementRole {
    /// A list row or other plain element.
    #[default]
    Item,
    /// A link (host-page conversation rows are anchors).
    Link,
    /// A button inside a row (rename, delete, menu).
    Button,
    /// An input, textarea, or contenteditable element.
    Editable,
}

impl ElementRole {
    /// Whether a press on this element may start a drag.
    #[must_use]
    pub fn can_start_drag(self) -> bool {
        matches!(self, Self::Item | Self::Link)
    }
}

/// Snapshot of one element as seen by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementInfo {
    pub id: ElementId,
    pub role: ElementRole,
    /// Raw attributes (`data-conversation-id`, `href`, ...).
    pub attributes: BTreeMap<String, String>,
    /// Visible text content, trimmed by the host.
    pub text: Option<String>,
    pub parent: Option<ElementId>,
    /// Nearest enclosing folder container (`.le-chat-plus-folder-item`).
    pub closest_folder: Option<ElementId>,
    /// Nearest enclosing extension list root.
    pub closest_root: Option<ElementId>,
    pub bounds: Rect,
}

impl ElementInfo {
    #[must_use]
    pub fn new(id: ElementId) -> Self {
        Self { id, ..Default::default() }
    }

    /// Read an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Set an attribute, builder style.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.attr(CONVERSATION_ID_ATTR)
    }

    #[must_use]
    pub fn folder_id(&self) -> Option<&str> {
        self.attr(FOLDER_ID_ATTR)
    }

    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.attr(HREF_ATTR)
    }

    /// Display title: explicit title attribute, else non-blank text.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attr(CONVERSATION_TITLE_ATTR)
            .or_else(|| self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()))
    }
}

/// Drop candidate kinds, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Conversation,
    FolderHeader,
    RootArea,
}

/// One entry of the spatial index the classifier runs over.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub element: ElementId,
    pub kind: CandidateKind,
    pub bounds: Rect,
    /// Stacking order; higher is on top.
    pub z: i32,
    /// Conversation id for conversation items.
    pub conversation_id: Option<String>,
    /// Enclosing folder id for conversation items, own folder for headers.
    pub folder_id: Option<String>,
    /// Enclosing folder container element, highlighted alongside headers.
    pub folder_element: Option<ElementId>,
    /// Area to re-render after a drop here (a popover list); `None` means everything.
    pub render_scope: Option<ElementId>,
}

/// Read-only DOM-equivalent capabilities.
pub trait HostSurface {
    /// Elements currently rendered for a drag source population.
    fn population(&self, kind: SourceKind) -> Vec<ElementId>;

    /// Info for a live element; `None` once it has left the document.
    fn element(&self, id: ElementId) -> Option<ElementInfo>;

    /// Current drop candidates with their bounding boxes.
    fn drop_candidates(&self) -> Vec<Candidate>;
}
