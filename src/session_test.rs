use super::*;
use crate::consts::{FOLDERS_KEY, STANDALONE_KEY};
use crate::drag::TargetKind;
use crate::model::{Container, ConversationRef, Folder};
use crate::storage::MemoryStore;
use crate::storage::test_helpers::FlakyStore;
use crate::surface::ElementRole;
use crate::surface::test_helpers::{FakeSurface, ROW_H};

// =============================================================
// Helpers
// =============================================================

fn conv(id: &str) -> ConversationRef {
    ConversationRef { id: id.into(), title: format!("Title {id}"), url: format!("https://chat/{id}"), added_at: 1 }
}

/// Store: A = [x, y, z], B = [], standalone = [s1].
/// Surface rows: A header, x, y, z, B header, s1, spare root row.
/// Host page: h1 beside the list.
struct Fixture<S> {
    session: DragSession<S>,
    surface: FakeSurface,
    a: Folder,
    b: Folder,
    b_header: ElementId,
    a_items: Vec<ElementId>,
    s1: ElementId,
    h1: ElementId,
}

async fn fixture_with<S: KeyValueStore>(backend: S) -> Fixture<S> {
    let store = EntityStore::new(backend);
    let a = store.create_folder("A").await.unwrap();
    let b = store.create_folder("B").await.unwrap();
    for id in ["x", "y", "z"] {
        store.add_conversation(&Container::Folder(a.id.clone()), conv(id), None).await.unwrap();
    }
    store.add_conversation(&Container::Standalone, conv("s1"), None).await.unwrap();

    let mut surface = FakeSurface::new();
    let (_, _, a_items) = surface.add_folder(&a.id, &["x", "y", "z"]);
    let (_, b_header, _) = surface.add_folder(&b.id, &[]);
    let s1 = surface.add_standalone("s1");
    let h1 = surface.add_host_item("h1");
    surface.seal();

    let mut session = DragSession::new(store, DragConfig::default());
    session.setup_host_page_items(&surface);
    session.setup_folder_items(&surface);
    session.setup_standalone_items(&surface);

    Fixture { session, surface, a, b, b_header, a_items, s1, h1 }
}

async fn fixture() -> Fixture<MemoryStore> {
    fixture_with(MemoryStore::new()).await
}

async fn ids<S: KeyValueStore>(session: &DragSession<S>, container: &Container) -> Vec<String> {
    session.store().conversations(container).await.unwrap().into_iter().map(|c| c.id).collect()
}

fn writes(session: &DragSession<MemoryStore>) -> usize {
    session.store().backend().writes()
}

impl<S: KeyValueStore> Fixture<S> {
    fn press(&mut self, kind: SourceKind, element: ElementId, at: Point) -> Vec<Action> {
        self.session.on_pointer_down(kind, &self.surface, element, Button::Primary, at)
    }

    /// Press on `element`, move to `to`, release there.
    async fn drag(&mut self, kind: SourceKind, element: ElementId, to: Point) -> Vec<Action> {
        let from = self.surface.point_in(element, true);
        self.press(kind, element, from);
        self.session.on_pointer_move(&self.surface, to);
        self.session.on_pointer_up(&self.surface, to).await
    }
}

fn outcome(actions: &[Action]) -> Option<(DropOutcome, u32)> {
    actions.iter().find_map(|a| match a {
        Action::AnimateIndicator { outcome, duration_ms } => Some((*outcome, *duration_ms)),
        _ => None,
    })
}

fn folder(id: &str) -> Container {
    Container::Folder(id.into())
}

// =============================================================
// Threshold
// =============================================================

#[tokio::test]
async fn click_below_threshold_is_not_a_drag() {
    let mut f = fixture().await;
    let before = writes(&f.session);
    let at = f.surface.point_in(f.a_items[0], true);

    let actions = f.press(SourceKind::Folder, f.a_items[0], at);
    assert!(matches!(actions.as_slice(), [Action::CreateIndicator { .. }]));
    assert_eq!(f.session.phase(), DragPhase::Armed);

    let nudged = Point::new(at.x + 3.0, at.y + 3.0);
    assert!(f.session.on_pointer_move(&f.surface, nudged).is_empty());
    assert!(!f.session.state().is_dragging);

    let actions = f.session.on_pointer_up(&f.surface, nudged).await;
    assert_eq!(actions, vec![Action::RemoveIndicator]);
    assert_eq!(f.session.phase(), DragPhase::Idle);
    assert_eq!(*f.session.state(), DragState::default());
    assert_eq!(writes(&f.session), before);
}

#[tokio::test]
async fn crossing_threshold_starts_drag() {
    let mut f = fixture().await;
    let x = f.a_items[0];
    let at = f.surface.point_in(x, true);
    f.press(SourceKind::Folder, x, at);

    let to = f.surface.point_in(f.a_items[2], false);
    let actions = f.session.on_pointer_move(&f.surface, to);
    assert_eq!(
        actions[..5],
        [
            Action::SuppressDefault,
            Action::DisableTextSelection,
            Action::AddClass { element: x, class: DRAGGING_CLASS },
            Action::ShowIndicator,
            Action::MoveIndicator(to),
        ]
    );
    assert!(actions.contains(&Action::ClearHighlights));
    assert!(f.session.state().is_dragging);
    assert_eq!(f.session.phase(), DragPhase::Dragging);
    assert_eq!(f.session.state().potential_drop_target.conversation_id.as_deref(), Some("z"));
}

#[tokio::test]
async fn indicator_label_is_row_title() {
    let mut f = fixture().await;
    let at = f.surface.point_in(f.a_items[1], true);
    let actions = f.press(SourceKind::Folder, f.a_items[1], at);
    assert_eq!(actions, vec![Action::CreateIndicator { label: "Title y".into(), at }]);
}

#[tokio::test]
async fn custom_threshold_is_honored() {
    let mut f = fixture().await;
    let store = EntityStore::new(MemoryStore::new());
    f.session = DragSession::new(store, DragConfig { threshold_px: 50.0, ..DragConfig::default() });
    f.session.setup_folder_items(&f.surface);

    let at = f.surface.point_in(f.a_items[0], true);
    f.press(SourceKind::Folder, f.a_items[0], at);
    assert!(f.session.on_pointer_move(&f.surface, Point::new(at.x, at.y + 20.0)).is_empty());
    assert!(!f.session.on_pointer_move(&f.surface, Point::new(at.x, at.y + 60.0)).is_empty());
    assert_eq!(f.session.phase(), DragPhase::Dragging);
}

// =============================================================
// Drops through pointer events
// =============================================================

#[tokio::test]
async fn same_folder_reorder() {
    let mut f = fixture().await;
    let to = f.surface.point_in(f.a_items[2], false);
    let actions = f.drag(SourceKind::Folder, f.a_items[0], to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Committed, 150)));
    assert!(actions.contains(&Action::RenderNeeded { scope: None }));
    assert_eq!(actions.last(), Some(&Action::ScheduleSettle { after_ms: 150 }));
    assert_eq!(ids(&f.session, &folder(&f.a.id)).await, ["y", "z", "x"]);
}

#[tokio::test]
async fn cross_folder_move_onto_header() {
    let mut f = fixture().await;
    let to = f.surface.point_in(f.b_header, true);
    let actions = f.drag(SourceKind::Folder, f.a_items[1], to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Committed, 150)));
    assert_eq!(ids(&f.session, &folder(&f.a.id)).await, ["x", "z"]);
    assert_eq!(ids(&f.session, &folder(&f.b.id)).await, ["y"]);
    let store = f.session.store();
    assert_eq!(store.folder(&f.a.id).await.unwrap().unwrap().conversation_count, 2);
    assert_eq!(store.folder(&f.b.id).await.unwrap().unwrap().conversation_count, 1);
}

#[tokio::test]
async fn host_item_to_root_area() {
    let mut f = fixture().await;
    let to = Point::new(10.0, ROW_H * 6.5);
    let actions = f.drag(SourceKind::HostPage, f.h1, to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Committed, 150)));
    assert_eq!(ids(&f.session, &Container::Standalone).await, ["s1", "h1"]);
}

#[tokio::test]
async fn off_target_release_reverts() {
    let mut f = fixture().await;
    let before = writes(&f.session);
    let actions = f.drag(SourceKind::Standalone, f.s1, Point::new(5_000.0, 5_000.0)).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Reverted, 300)));
    assert!(!actions.iter().any(|a| matches!(a, Action::RenderNeeded { .. })));
    assert_eq!(actions.last(), Some(&Action::ScheduleSettle { after_ms: 300 }));
    assert_eq!(writes(&f.session), before);
    assert_eq!(*f.session.state(), DragState::default());
}

#[tokio::test]
async fn host_item_to_root_without_folders() {
    let store = EntityStore::new(MemoryStore::new());
    for id in ["p1", "p2"] {
        store.add_standalone_conversation(conv(id), None).await.unwrap();
    }
    let mut surface = FakeSurface::new();
    surface.add_standalone("p1");
    surface.add_standalone("p2");
    let h = surface.add_host_item("h");
    surface.seal();

    let mut session = DragSession::new(store, DragConfig::default());
    session.setup_host_page_items(&surface);
    let from = surface.point_in(h, true);
    let to = Point::new(10.0, ROW_H * 2.5);
    session.on_pointer_down(SourceKind::HostPage, &surface, h, Button::Primary, from);
    session.on_pointer_move(&surface, to);
    let actions = session.on_pointer_up(&surface, to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Committed, 150)));
    assert_eq!(ids(&session, &Container::Standalone).await, ["p1", "p2", "h"]);
    assert!(session.store().folders().await.unwrap().is_empty());
}

#[tokio::test]
async fn detached_mid_drag_reverts_without_writes() {
    let mut f = fixture().await;
    let before = writes(&f.session);
    let x = f.a_items[0];
    f.press(SourceKind::Folder, x, f.surface.point_in(x, true));
    let to = f.surface.point_in(f.b_header, true);
    f.session.on_pointer_move(&f.surface, to);
    f.surface.detach(x);

    let actions = f.session.on_pointer_up(&f.surface, to).await;
    assert_eq!(outcome(&actions), Some((DropOutcome::Reverted, 300)));
    assert_eq!(writes(&f.session), before);
}

#[tokio::test]
async fn storage_failure_reverts_and_leaves_lists() {
    let mut f = fixture_with(FlakyStore::default()).await;
    f.session.store().backend().fail_writes.set(true);
    let to = f.surface.point_in(f.b_header, true);
    let actions = f.drag(SourceKind::Folder, f.a_items[0], to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Reverted, 300)));
    assert_eq!(ids(&f.session, &folder(&f.a.id)).await, ["x", "y", "z"]);
    assert!(ids(&f.session, &folder(&f.b.id)).await.is_empty());
    assert_eq!(f.session.phase(), DragPhase::Settling);
}

#[tokio::test]
async fn failed_count_write_keeps_source_intact() {
    let mut f = fixture_with(FlakyStore::default()).await;
    f.session.store().backend().reject_key.set(Some(FOLDERS_KEY));
    let to = f.surface.point_in(f.b_header, true);
    let actions = f.drag(SourceKind::Folder, f.a_items[0], to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Reverted, 300)));
    assert_eq!(ids(&f.session, &folder(&f.a.id)).await, ["x", "y", "z"]);
    assert!(ids(&f.session, &folder(&f.b.id)).await.is_empty());
    let store = f.session.store();
    assert_eq!(store.folder(&f.a.id).await.unwrap().unwrap().conversation_count, 3);
    assert_eq!(store.folder(&f.b.id).await.unwrap().unwrap().conversation_count, 0);
}

#[tokio::test]
async fn failed_destination_write_restores_source() {
    let mut f = fixture_with(FlakyStore::default()).await;
    f.session.store().backend().reject_key.set(Some(STANDALONE_KEY));
    let to = Point::new(10.0, ROW_H * 6.5);
    let actions = f.drag(SourceKind::Folder, f.a_items[1], to).await;

    assert_eq!(outcome(&actions), Some((DropOutcome::Reverted, 300)));
    assert_eq!(ids(&f.session, &folder(&f.a.id)).await, ["x", "y", "z"]);
    assert_eq!(ids(&f.session, &Container::Standalone).await, ["s1"]);
    let store = f.session.store();
    assert_eq!(store.folder(&f.a.id).await.unwrap().unwrap().conversation_count, 3);
}

// =============================================================
// Single drag at a time
// =============================================================

#[tokio::test]
async fn press_ignored_while_dragging() {
    let mut f = fixture().await;
    let x = f.a_items[0];
    f.press(SourceKind::Folder, x, f.surface.point_in(x, true));
    f.session.on_pointer_move(&f.surface, f.surface.point_in(f.a_items[2], false));

    let at = f.surface.point_in(f.s1, true);
    assert!(f.press(SourceKind::Standalone, f.s1, at).is_empty());
    assert_eq!(f.session.state().dragged_element, Some(x));
    assert_eq!(f.session.state().source_kind, SourceKind::Folder);
}

#[tokio::test]
async fn press_ignored_while_settling() {
    let mut f = fixture().await;
    let to = f.surface.point_in(f.a_items[2], false);
    f.drag(SourceKind::Folder, f.a_items[0], to).await;
    assert_eq!(f.session.phase(), DragPhase::Settling);
    assert_eq!(*f.session.state(), DragState::default());

    let at = f.surface.point_in(f.s1, true);
    assert!(f.press(SourceKind::Standalone, f.s1, at).is_empty());

    let actions = f.session.settle();
    assert_eq!(
        actions,
        vec![Action::ClearDragClasses, Action::ClearHighlights, Action::RemoveIndicator, Action::RestoreTextSelection]
    );
    assert_eq!(f.session.phase(), DragPhase::Idle);
    assert!(!f.press(SourceKind::Standalone, f.s1, at).is_empty());
}

#[tokio::test]
async fn classify_outside_a_drag_leaves_state() {
    let mut f = fixture().await;
    let at = f.surface.point_in(f.b_header, true);
    assert!(f.session.classify_at(&f.surface, at).is_empty());
    assert_eq!(*f.session.state(), DragState::default());

    let x = f.a_items[0];
    f.press(SourceKind::Folder, x, f.surface.point_in(x, true));
    assert!(f.session.classify_at(&f.surface, at).is_empty());
    assert!(f.session.state().potential_drop_target.is_none());

    f.session.on_pointer_move(&f.surface, at);
    assert_eq!(f.session.classify_at(&f.surface, at)[0], Action::ClearHighlights);
    assert_eq!(f.session.state().potential_drop_target.kind, TargetKind::FolderHeader);
}

#[tokio::test]
async fn moves_and_releases_while_idle_do_nothing() {
    let mut f = fixture().await;
    assert!(f.session.on_pointer_move(&f.surface, Point::new(1.0, 1.0)).is_empty());
    assert!(f.session.on_pointer_up(&f.surface, Point::new(1.0, 1.0)).await.is_empty());
    assert!(f.session.settle().is_empty());
    assert!(f.session.cancel().is_empty());
}

// =============================================================
// Press filtering
// =============================================================

#[tokio::test]
async fn non_primary_button_ignored() {
    let mut f = fixture().await;
    let x = f.a_items[0];
    let at = f.surface.point_in(x, true);
    for button in [Button::Middle, Button::Secondary] {
        assert!(f.session.on_pointer_down(SourceKind::Folder, &f.surface, x, button, at).is_empty());
    }
    assert_eq!(f.session.phase(), DragPhase::Idle);
}

#[tokio::test]
async fn unwired_element_ignored() {
    let mut f = fixture().await;
    let late = f.surface.add_standalone("late");
    let at = f.surface.point_in(late, true);
    assert!(f.press(SourceKind::Standalone, late, at).is_empty());

    // Wrong population for a wired element.
    let x = f.a_items[0];
    assert!(f.press(SourceKind::Standalone, x, f.surface.point_in(x, true)).is_empty());

    assert_eq!(f.session.setup_standalone_items(&f.surface), vec![late]);
    assert!(!f.press(SourceKind::Standalone, late, at).is_empty());
}

#[tokio::test]
async fn buttons_and_inputs_do_not_start_drags() {
    let mut f = fixture().await;
    let x = f.a_items[0];
    let at = f.surface.point_in(x, true);
    for role in [ElementRole::Button, ElementRole::Editable] {
        if let Some(info) = f.surface.elements.get_mut(&x) {
            info.role = role;
        }
        assert!(f.press(SourceKind::Folder, x, at).is_empty());
    }
    assert_eq!(f.session.phase(), DragPhase::Idle);
}

#[tokio::test]
async fn row_without_identity_ignored() {
    let mut f = fixture().await;
    let x = f.a_items[0];
    if let Some(info) = f.surface.elements.get_mut(&x) {
        info.attributes.clear();
    }
    assert!(f.press(SourceKind::Folder, x, f.surface.point_in(x, true)).is_empty());
}

// =============================================================
// Cancel and setup
// =============================================================

#[tokio::test]
async fn cancel_while_armed_returns_to_idle() {
    let mut f = fixture().await;
    let x = f.a_items[0];
    f.press(SourceKind::Folder, x, f.surface.point_in(x, true));

    assert_eq!(f.session.cancel(), vec![Action::RemoveIndicator]);
    assert_eq!(f.session.phase(), DragPhase::Idle);
}

#[tokio::test]
async fn cancel_while_dragging_reverts_without_writes() {
    let mut f = fixture().await;
    let before = writes(&f.session);
    let x = f.a_items[0];
    f.press(SourceKind::Folder, x, f.surface.point_in(x, true));
    f.session.on_pointer_move(&f.surface, f.surface.point_in(f.b_header, true));

    let actions = f.session.cancel();
    assert_eq!(outcome(&actions), Some((DropOutcome::Reverted, 300)));
    assert_eq!(f.session.phase(), DragPhase::Settling);
    assert_eq!(writes(&f.session), before);
    assert!(f.session.on_pointer_up(&f.surface, Point::new(0.0, 0.0)).await.is_empty());
}

#[tokio::test]
async fn setup_is_idempotent_across_rerenders() {
    let mut f = fixture().await;
    assert!(f.session.setup_folder_items(&f.surface).is_empty());
    assert!(f.session.setup_host_page_items(&f.surface).is_empty());

    f.surface.detach(f.a_items[0]);
    assert!(f.session.setup_folder_items(&f.surface).is_empty());
    let wired = f.session.controller(SourceKind::Folder).map(SourceController::wired_count);
    assert_eq!(wired, Some(2));
    assert!(f.session.controller(SourceKind::None).is_none());
}
