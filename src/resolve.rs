//! Drop resolver: turns a released drag into entity store mutations.
//!
//! DESIGN
//! ======
//! Resolution is split in two. `plan_drop` is the pure decision table over
//! (source kind, source container, target kind, target position) and yields
//! a `DropPlan`. `execute` gathers the store facts the table needs (target
//! row index, current index of the dragged id), resolves the conversation's
//! display data, and applies the plan with ordered awaits.
//!
//! ERROR HANDLING
//! ==============
//! A missing target is not an error: it resolves to "nothing happened".
//! Missing identity and structural inconsistencies are reported as
//! `DropError` before any write. A transfer checks its destination before
//! removing from the source. If a write fails partway through, the
//! conversation is filed back at the list and index it held before the drop.

#[cfg(test)]
#[path = "resolve_test.rs"]
mod resolve_test;

use tracing::{debug, info, warn};

use crate::consts::{CHAT_ORIGIN, CHAT_URL_BASE, PLACEHOLDER_TITLE};
use crate::drag::{DragState, DropPosition, DropTarget, SourceKind, TargetKind};
use crate::model::{Container, ConversationRef, now_millis};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::EntityStore;
use crate::surface::{ElementInfo, HostSurface};

#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("dragged element has no identity")]
    MissingIdentity,
    #[error("no drop target")]
    MissingTarget,
    #[error("structural inconsistency: {0}")]
    Structural(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What a drop does, decided before touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPlan {
    /// Valid gesture with no effect (e.g. a folder row onto its own header).
    NoOp,
    /// Move within one list.
    Reorder { container: Container, index: usize },
    /// Take out of `from` (if tracked there) and file into `to`; `None` index appends.
    Transfer { from: Option<Container>, to: Container, index: Option<usize> },
}

/// Insertion index for a drop on a conversation row.
///
/// The row's index, plus one when dropping after it, minus one when the
/// dragged conversation already sits earlier in the same list (its removal
/// shifts the row up).
#[must_use]
pub fn computed_index(target_index: usize, position: DropPosition, dragged_index: Option<usize>) -> usize {
    let mut index = target_index + usize::from(position == DropPosition::After);
    if dragged_index.is_some_and(|src| src < target_index) {
        index -= 1;
    }
    index
}

/// The list a conversation-row target belongs to.
#[must_use]
pub fn row_container(target: &DropTarget) -> Container {
    match &target.folder_id {
        Some(folder_id) => Container::Folder(folder_id.clone()),
        None => Container::Standalone,
    }
}

/// The decision table.
///
/// `index` is the computed insertion index for conversation-row targets;
/// `None` when the row is not tracked in the store.
///
/// # Errors
///
/// `MissingTarget` for an unclassified target, `MissingIdentity` for an
/// unknown source kind, `Structural` when a folder id the transition needs
/// is absent.
pub fn plan_drop(
    source_kind: SourceKind,
    source: Option<&Container>,
    target: &DropTarget,
    index: Option<usize>,
) -> Result<DropPlan, DropError> {
    if target.kind == TargetKind::None {
        return Err(DropError::MissingTarget);
    }

    let header_folder = || {
        target
            .folder_id
            .clone()
            .map(Container::Folder)
            .ok_or_else(|| DropError::Structural("folder header without folder id".into()))
    };

    match source_kind {
        SourceKind::None => Err(DropError::MissingIdentity),

        SourceKind::Standalone => match target.kind {
            TargetKind::Conversation => {
                let to = row_container(target);
                if to == Container::Standalone {
                    reorder(to, index)
                } else {
                    Ok(DropPlan::Transfer { from: Some(Container::Standalone), to, index })
                }
            }
            TargetKind::FolderHeader => {
                Ok(DropPlan::Transfer { from: Some(Container::Standalone), to: header_folder()?, index: None })
            }
            TargetKind::RootArea | TargetKind::None => Ok(DropPlan::NoOp),
        },

        SourceKind::Folder => {
            let from = match source {
                Some(from @ Container::Folder(_)) => from.clone(),
                _ => return Err(DropError::Structural("folder row without source folder".into())),
            };
            match target.kind {
                TargetKind::Conversation => {
                    let to = row_container(target);
                    if to == from {
                        reorder(to, index)
                    } else {
                        Ok(DropPlan::Transfer { from: Some(from), to, index })
                    }
                }
                TargetKind::FolderHeader => {
                    let to = header_folder()?;
                    if to == from {
                        Ok(DropPlan::NoOp)
                    } else {
                        Ok(DropPlan::Transfer { from: Some(from), to, index: None })
                    }
                }
                TargetKind::RootArea => Ok(DropPlan::Transfer { from: Some(from), to: Container::Standalone, index: None }),
                TargetKind::None => Ok(DropPlan::NoOp),
            }
        }

        SourceKind::HostPage => match target.kind {
            TargetKind::Conversation => Ok(DropPlan::Transfer { from: None, to: row_container(target), index }),
            TargetKind::FolderHeader => Ok(DropPlan::Transfer { from: None, to: header_folder()?, index: None }),
            TargetKind::RootArea => Ok(DropPlan::Transfer { from: None, to: Container::Standalone, index: None }),
            TargetKind::None => Ok(DropPlan::NoOp),
        },
    }
}

fn reorder(container: Container, index: Option<usize>) -> Result<DropPlan, DropError> {
    match index {
        Some(index) => Ok(DropPlan::Reorder { container, index }),
        None => Err(DropError::Structural(format!("reorder target row not tracked in {container}"))),
    }
}

/// Resolve and apply a drop described by `snapshot`.
///
/// Returns whether the store changed.
///
/// # Errors
///
/// Any `DropError`; no store write has happened when an error other than
/// `Storage` is returned.
pub async fn execute<S, H>(store: &EntityStore<S>, surface: &H, snapshot: &DragState) -> Result<bool, DropError>
where
    S: KeyValueStore,
    H: HostSurface,
{
    let element = snapshot.dragged_element.ok_or(DropError::MissingIdentity)?;
    let conv_id = snapshot.dragged_element_id.as_deref().ok_or(DropError::MissingIdentity)?;
    let target = &snapshot.potential_drop_target;
    if target.is_none() {
        return Ok(false);
    }
    let dragged = surface.element(element).ok_or(DropError::MissingIdentity)?;

    let index = match target.kind {
        TargetKind::Conversation => {
            let list = store.conversations(&row_container(target)).await?;
            let target_index = target
                .conversation_id
                .as_deref()
                .and_then(|id| list.iter().position(|c| c.id == id));
            let dragged_index = list.iter().position(|c| c.id == conv_id);
            target_index.map(|t| computed_index(t, target.position, dragged_index))
        }
        _ => None,
    };

    let source = snapshot.source_container.as_ref().and_then(|c| c.container());
    let plan = plan_drop(snapshot.source_kind, source.as_ref(), target, index)?;
    debug!(conversation_id = conv_id, ?plan, "drop planned");
    if plan == DropPlan::NoOp {
        return Ok(false);
    }

    let conv = conversation_ref(store, &dragged, conv_id).await?;
    let changed = apply(store, plan, conv).await?;
    if changed {
        info!(conversation_id = conv_id, source = ?snapshot.source_kind, target = ?target.kind, "drop committed");
    }
    Ok(changed)
}

/// Display data for the dragged conversation: the element's own title and
/// link first, then what the store already knows, then placeholders.
async fn conversation_ref<S: KeyValueStore>(
    store: &EntityStore<S>,
    info: &ElementInfo,
    conv_id: &str,
) -> Result<ConversationRef, StorageError> {
    let stored = match store.locate_conversation(conv_id).await? {
        Some((container, index)) => store.conversations(&container).await?.into_iter().nth(index),
        None => None,
    };

    let title = info
        .title()
        .map(str::to_string)
        .or_else(|| stored.as_ref().map(|c| c.title.clone()))
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
    let url = info
        .href()
        .map(absolute_url)
        .or_else(|| stored.as_ref().map(|c| c.url.clone()))
        .unwrap_or_else(|| format!("{CHAT_URL_BASE}{conv_id}"));
    let added_at = stored.map_or_else(now_millis, |c| c.added_at);

    Ok(ConversationRef { id: conv_id.to_string(), title, url, added_at })
}

/// Resolve a possibly relative link against the chat application origin.
#[must_use]
pub fn absolute_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{CHAT_ORIGIN}{href}")
    } else {
        format!("{CHAT_ORIGIN}/{href}")
    }
}

async fn apply<S: KeyValueStore>(store: &EntityStore<S>, plan: DropPlan, conv: ConversationRef) -> Result<bool, DropError> {
    match plan {
        DropPlan::NoOp => Ok(false),
        DropPlan::Reorder { container, index } => Ok(store.reorder(&container, &conv.id, to_position(index)).await?),
        DropPlan::Transfer { from, to, index } => {
            if let Container::Folder(folder_id) = &to {
                if store.folder(folder_id).await?.is_none() {
                    return Err(DropError::Structural(format!("target folder {folder_id} no longer exists")));
                }
            }

            let origin = store.locate_conversation(&conv.id).await?;
            match transfer(store, from, &to, index, conv.clone()).await {
                Ok(changed) => Ok(changed),
                Err(e) => {
                    if let Some((container, position)) = origin {
                        restore(store, &container, conv, position).await;
                    }
                    Err(e.into())
                }
            }
        }
    }
}

/// Take `conv` out of `from` and file it into `to`. Adding evicts the id
/// from every other list, so `from` only matters when it differs from `to`.
async fn transfer<S: KeyValueStore>(
    store: &EntityStore<S>,
    from: Option<Container>,
    to: &Container,
    index: Option<usize>,
    conv: ConversationRef,
) -> Result<bool, StorageError> {
    let mut changed = false;
    if let Some(from) = from.filter(|f| f != to) {
        changed |= store.remove_conversation(&from, &conv.id).await?;
    }
    changed |= store.add_conversation(to, conv, index.map(to_position)).await?;
    Ok(changed)
}

/// Put a conversation back where it was before a failed transfer.
async fn restore<S: KeyValueStore>(store: &EntityStore<S>, container: &Container, conv: ConversationRef, position: usize) {
    let conversation_id = conv.id.clone();
    match store.add_conversation(container, conv, Some(to_position(position))).await {
        Ok(_) => warn!(%container, conversation_id = %conversation_id, "transfer failed; conversation restored"),
        Err(e) => warn!(%container, conversation_id = %conversation_id, error = %e, "transfer failed; restore failed too"),
    }
}

fn to_position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
