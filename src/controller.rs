//! Per-source-kind drag controllers.
//!
//! Each controller owns one element population it does not render: host-page
//! rows, folder rows, or standalone rows. It keeps an explicit registry of
//! the elements it has wired so repeated setup calls after a re-render attach
//! listeners only to new elements, and it derives the drag origin (conversation
//! id plus source container) for a press on one of them.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::collections::HashSet;

use tracing::warn;

use crate::drag::{ContainerRef, SourceKind};
use crate::surface::{ElementId, ElementInfo, HostSurface};

/// Identity of a drag, captured on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOrigin {
    pub element: ElementId,
    pub conversation_id: String,
    pub container: ContainerRef,
}

/// Trailing path segment of a conversation link, ignoring query and fragment.
#[must_use]
pub fn conversation_id_from_href(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href).trim_end_matches('/');
    let (head, last) = path.rsplit_once('/')?;
    if last.is_empty() || head.is_empty() || head.ends_with('/') {
        return None;
    }
    Some(last)
}

pub struct SourceController {
    kind: SourceKind,
    wired: HashSet<ElementId>,
}

impl SourceController {
    #[must_use]
    pub fn new(kind: SourceKind) -> Self {
        Self { kind, wired: HashSet::new() }
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Wire every element of this population not wired yet.
    ///
    /// Idempotent: returns only the newly wired elements, which are the ones
    /// the host must attach pointer listeners to.
    pub fn setup(&mut self, surface: &impl HostSurface) -> Vec<ElementId> {
        let mut fresh: Vec<ElementId> = surface
            .population(self.kind)
            .into_iter()
            .filter(|id| self.wired.insert(*id))
            .collect();
        fresh.sort();
        fresh
    }

    /// Forget wired elements that are no longer rendered. Returns how many.
    pub fn prune(&mut self, surface: &impl HostSurface) -> usize {
        let live: HashSet<ElementId> = surface.population(self.kind).into_iter().collect();
        let before = self.wired.len();
        self.wired.retain(|id| live.contains(id));
        before - self.wired.len()
    }

    #[must_use]
    pub fn is_wired(&self, id: ElementId) -> bool {
        self.wired.contains(&id)
    }

    #[must_use]
    pub fn wired_count(&self) -> usize {
        self.wired.len()
    }

    /// Derive the drag origin for a press on `info`.
    ///
    /// `None` when the element carries no usable conversation id or its
    /// container cannot be determined.
    #[must_use]
    pub fn origin(&self, surface: &impl HostSurface, info: &ElementInfo) -> Option<DragOrigin> {
        let conversation_id = match self.kind {
            SourceKind::HostPage => info.href().and_then(conversation_id_from_href),
            SourceKind::Folder | SourceKind::Standalone => info.conversation_id(),
            SourceKind::None => None,
        }?
        .to_string();

        let container = match self.kind {
            SourceKind::HostPage => ContainerRef::Parent(info.parent.unwrap_or(info.id)),
            SourceKind::Folder => {
                let element = info.closest_folder?;
                let folder_id = surface
                    .element(element)
                    .and_then(|folder| folder.folder_id().map(str::to_string))
                    .or_else(|| info.folder_id().map(str::to_string));
                let Some(folder_id) = folder_id else {
                    warn!(element = element.0, "folder container has no folder id");
                    return None;
                };
                ContainerRef::Folder { element, folder_id }
            }
            SourceKind::Standalone => ContainerRef::RootList(info.closest_root.or(info.parent).unwrap_or(info.id)),
            SourceKind::None => return None,
        };

        Some(DragOrigin { element: info.id, conversation_id, container })
    }
}
