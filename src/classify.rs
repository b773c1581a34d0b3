//! Drop-target classification.
//!
//! `classify` is pure: it runs over the spatial index the host reports
//! (bounding boxes plus kind tags) and never looks at live elements.
//! Priority is conversation row, then folder header, then root area; within
//! a kind the topmost candidate wins (highest `z`, later entries on ties).

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;

use crate::consts::{DROP_AFTER_CLASS, DROP_BEFORE_CLASS, FOLDER_DROP_CLASS, HEADER_DROP_CLASS, ROOT_DROP_CLASS};
use crate::drag::{DropPosition, DropTarget, TargetKind};
use crate::geom::Point;
use crate::session::Action;
use crate::surface::{Candidate, CandidateKind, ElementId};

const PRIORITY: [CandidateKind; 3] = [CandidateKind::Conversation, CandidateKind::FolderHeader, CandidateKind::RootArea];

/// Classify what lies under `cursor`, ignoring the dragged element.
#[must_use]
pub fn classify(cursor: Point, candidates: &[Candidate], dragged: Option<ElementId>) -> DropTarget {
    let hits: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| Some(c.element) != dragged && c.bounds.contains(cursor))
        .collect();

    for kind in PRIORITY {
        let Some(best) = hits.iter().filter(|c| c.kind == kind).max_by_key(|c| c.z) else {
            continue;
        };
        return target_for(best, cursor);
    }
    DropTarget::default()
}

fn target_for(candidate: &Candidate, cursor: Point) -> DropTarget {
    let (kind, position) = match candidate.kind {
        CandidateKind::Conversation => {
            let position = if candidate.bounds.in_upper_half(cursor) { DropPosition::Before } else { DropPosition::After };
            (TargetKind::Conversation, position)
        }
        CandidateKind::FolderHeader => (TargetKind::FolderHeader, DropPosition::Inside),
        CandidateKind::RootArea => (TargetKind::RootArea, DropPosition::Inside),
    };
    DropTarget {
        target: Some(candidate.element),
        kind,
        position,
        conversation_id: candidate.conversation_id.clone(),
        folder_id: candidate.folder_id.clone(),
        folder_element: candidate.folder_element,
        render_scope: candidate.render_scope,
    }
}

/// Highlight classes for a classified target. The caller clears previous
/// highlights first.
#[must_use]
pub fn highlight_actions(target: &DropTarget) -> Vec<Action> {
    let Some(element) = target.target else {
        return Vec::new();
    };
    match target.kind {
        TargetKind::Conversation => {
            let class = if target.position == DropPosition::Before { DROP_BEFORE_CLASS } else { DROP_AFTER_CLASS };
            vec![Action::AddClass { element, class }]
        }
        TargetKind::FolderHeader => {
            let mut actions = vec![Action::AddClass { element, class: HEADER_DROP_CLASS }];
            if let Some(folder) = target.folder_element {
                actions.push(Action::AddClass { element: folder, class: FOLDER_DROP_CLASS });
            }
            actions
        }
        TargetKind::RootArea => vec![Action::AddClass { element, class: ROOT_DROP_CLASS }],
        TargetKind::None => Vec::new(),
    }
}
