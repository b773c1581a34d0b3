//! Drag session: the single state-machine actor every controller feeds.
//!
//! DESIGN
//! ======
//! One `DragSession` owns the `DragState`, the three source controllers, and
//! the entity store. The host forwards pointer events for wired elements and
//! applies the returned `Action`s to the DOM. Because the session is the only
//! writer of the drag record, at most one drag is live: a press while a drag
//! is armed, in flight, or settling is ignored.
//!
//! Lifecycle: `Idle` → press → `Armed` → move past the threshold →
//! `Dragging` → release → `Settling` → host timer calls `settle` → `Idle`.
//! A release while `Armed` is a click and returns straight to `Idle`.
//!
//! ERROR HANDLING
//! ==============
//! `on_pointer_up` is the catch boundary. Every drop failure is logged and
//! converted into the revert animation; nothing escapes to the host page.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{debug, warn};

use crate::classify::{classify, highlight_actions};
use crate::config::DragConfig;
use crate::consts::{DRAGGING_CLASS, PLACEHOLDER_TITLE};
use crate::controller::SourceController;
use crate::drag::{Button, DragPhase, DragState, DropTarget, SourceKind};
use crate::geom::Point;
use crate::resolve;
use crate::storage::KeyValueStore;
use crate::store::EntityStore;
use crate::surface::{ElementId, HostSurface};

/// How a released drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The store changed; fast fade.
    Committed,
    /// Nothing changed; shrink-and-fade back.
    Reverted,
}

/// Instructions returned to the host layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `preventDefault` on the current pointer event.
    SuppressDefault,
    /// Create the floating indicator at the cursor, hidden.
    CreateIndicator { label: String, at: Point },
    ShowIndicator,
    MoveIndicator(Point),
    AnimateIndicator { outcome: DropOutcome, duration_ms: u32 },
    RemoveIndicator,
    AddClass { element: ElementId, class: &'static str },
    /// Remove every drop highlight class from every element.
    ClearHighlights,
    /// Remove the dragging class from every element.
    ClearDragClasses,
    DisableTextSelection,
    RestoreTextSelection,
    /// Call `settle` after this many milliseconds.
    ScheduleSettle { after_ms: u32 },
    /// Re-render folder UI; `None` scope means everything.
    RenderNeeded { scope: Option<ElementId> },
}

pub struct DragSession<S> {
    store: EntityStore<S>,
    config: DragConfig,
    state: DragState,
    phase: DragPhase,
    host_page: SourceController,
    folder: SourceController,
    standalone: SourceController,
}

impl<S: KeyValueStore> DragSession<S> {
    #[must_use]
    pub fn new(store: EntityStore<S>, config: DragConfig) -> Self {
        Self {
            store,
            config,
            state: DragState::default(),
            phase: DragPhase::Idle,
            host_page: SourceController::new(SourceKind::HostPage),
            folder: SourceController::new(SourceKind::Folder),
            standalone: SourceController::new(SourceKind::Standalone),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn store(&self) -> &EntityStore<S> {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> DragConfig {
        self.config
    }

    #[must_use]
    pub fn controller(&self, kind: SourceKind) -> Option<&SourceController> {
        match kind {
            SourceKind::HostPage => Some(&self.host_page),
            SourceKind::Folder => Some(&self.folder),
            SourceKind::Standalone => Some(&self.standalone),
            SourceKind::None => None,
        }
    }

    // --- Controller setup ---

    /// Wire host-page conversation rows. Returns elements needing listeners.
    pub fn setup_host_page_items(&mut self, surface: &impl HostSurface) -> Vec<ElementId> {
        self.host_page.prune(surface);
        self.host_page.setup(surface)
    }

    /// Wire folder conversation rows. Returns elements needing listeners.
    pub fn setup_folder_items(&mut self, surface: &impl HostSurface) -> Vec<ElementId> {
        self.folder.prune(surface);
        self.folder.setup(surface)
    }

    /// Wire standalone conversation rows. Returns elements needing listeners.
    pub fn setup_standalone_items(&mut self, surface: &impl HostSurface) -> Vec<ElementId> {
        self.standalone.prune(surface);
        self.standalone.setup(surface)
    }

    // --- Pointer events ---

    /// Press on a wired element of population `kind`.
    pub fn on_pointer_down(
        &mut self,
        kind: SourceKind,
        surface: &impl HostSurface,
        element: ElementId,
        button: Button,
        at: Point,
    ) -> Vec<Action> {
        if self.phase != DragPhase::Idle || self.state.is_dragging {
            debug!(element = element.0, phase = ?self.phase, "press ignored; drag in flight");
            return Vec::new();
        }
        if button != Button::Primary {
            return Vec::new();
        }
        let Some(controller) = self.controller(kind) else {
            return Vec::new();
        };
        if !controller.is_wired(element) {
            return Vec::new();
        }
        let Some(info) = surface.element(element) else {
            return Vec::new();
        };
        if !info.role.can_start_drag() {
            return Vec::new();
        }
        let Some(origin) = controller.origin(surface, &info) else {
            warn!(element = element.0, source = ?kind, "press on element without conversation identity");
            return Vec::new();
        };

        debug!(conversation_id = %origin.conversation_id, source = ?kind, "drag armed");
        self.state = DragState {
            is_dragging: false,
            source_kind: kind,
            dragged_element: Some(element),
            dragged_element_id: Some(origin.conversation_id),
            source_container: Some(origin.container),
            cursor_start: at,
            cursor_current: at,
            potential_drop_target: DropTarget::default(),
        };
        self.phase = DragPhase::Armed;
        let label = info.title().unwrap_or(PLACEHOLDER_TITLE).to_string();
        vec![Action::CreateIndicator { label, at }]
    }

    /// Pointer moved anywhere in the document.
    pub fn on_pointer_move(&mut self, surface: &impl HostSurface, at: Point) -> Vec<Action> {
        match self.phase {
            DragPhase::Armed => {
                self.state.cursor_current = at;
                if self.state.travel() < self.config.threshold_px {
                    return Vec::new();
                }
                debug!(conversation_id = ?self.state.dragged_element_id, "drag threshold crossed");
                self.state.is_dragging = true;
                self.phase = DragPhase::Dragging;

                let mut actions = vec![Action::SuppressDefault, Action::DisableTextSelection];
                if let Some(element) = self.state.dragged_element {
                    actions.push(Action::AddClass { element, class: DRAGGING_CLASS });
                }
                actions.push(Action::ShowIndicator);
                actions.push(Action::MoveIndicator(at));
                actions.extend(self.classify_at(surface, at));
                actions
            }
            DragPhase::Dragging => {
                let mut actions = vec![Action::SuppressDefault, Action::MoveIndicator(at)];
                actions.extend(self.classify_at(surface, at));
                actions
            }
            DragPhase::Idle | DragPhase::Settling => Vec::new(),
        }
    }

    /// Pointer released anywhere in the document.
    pub async fn on_pointer_up(&mut self, surface: &impl HostSurface, at: Point) -> Vec<Action> {
        match self.phase {
            DragPhase::Armed => {
                self.state.reset();
                self.phase = DragPhase::Idle;
                vec![Action::RemoveIndicator]
            }
            DragPhase::Dragging => {
                self.state.cursor_current = at;
                let snapshot = std::mem::take(&mut self.state);
                self.phase = DragPhase::Settling;

                let committed = self.drop_snapshot(surface, &snapshot).await;
                let outcome = if committed { DropOutcome::Committed } else { DropOutcome::Reverted };
                let duration_ms = self.config.fade_ms(committed);

                let mut actions = vec![Action::ClearHighlights, Action::AnimateIndicator { outcome, duration_ms }];
                if committed {
                    actions.push(Action::RenderNeeded { scope: snapshot.potential_drop_target.render_scope });
                }
                actions.push(Action::ScheduleSettle { after_ms: duration_ms });
                actions
            }
            DragPhase::Idle | DragPhase::Settling => Vec::new(),
        }
    }

    /// Abort the gesture in flight (pointer cancel, Escape, window blur).
    pub fn cancel(&mut self) -> Vec<Action> {
        match self.phase {
            DragPhase::Armed => {
                self.state.reset();
                self.phase = DragPhase::Idle;
                vec![Action::RemoveIndicator]
            }
            DragPhase::Dragging => {
                self.state.reset();
                self.phase = DragPhase::Settling;
                let duration_ms = self.config.fade_ms(false);
                vec![
                    Action::ClearHighlights,
                    Action::AnimateIndicator { outcome: DropOutcome::Reverted, duration_ms },
                    Action::ScheduleSettle { after_ms: duration_ms },
                ]
            }
            DragPhase::Idle | DragPhase::Settling => Vec::new(),
        }
    }

    /// End of the indicator animation: tear down all drag visuals.
    pub fn settle(&mut self) -> Vec<Action> {
        if self.phase != DragPhase::Settling {
            return Vec::new();
        }
        self.state.reset();
        self.phase = DragPhase::Idle;
        vec![
            Action::ClearDragClasses,
            Action::ClearHighlights,
            Action::RemoveIndicator,
            Action::RestoreTextSelection,
        ]
    }

    // --- Entry points ---

    /// Re-classify the target under `at` and refresh highlights. Does
    /// nothing unless a drag is live.
    pub fn classify_at(&mut self, surface: &impl HostSurface, at: Point) -> Vec<Action> {
        if self.phase != DragPhase::Dragging {
            return Vec::new();
        }
        self.state.cursor_current = at;
        let target = classify(at, &surface.drop_candidates(), self.state.dragged_element);
        let mut actions = vec![Action::ClearHighlights];
        actions.extend(highlight_actions(&target));
        self.state.potential_drop_target = target;
        actions
    }

    /// Execute the drop a snapshot describes. Returns whether the store changed.
    pub async fn drop_snapshot(&self, surface: &impl HostSurface, snapshot: &DragState) -> bool {
        match resolve::execute(&self.store, surface, snapshot).await {
            Ok(changed) => changed,
            Err(e) => {
                warn!(
                    error = %e,
                    conversation_id = ?snapshot.dragged_element_id,
                    source = ?snapshot.source_kind,
                    "drop failed; reverting"
                );
                if matches!(e, resolve::DropError::Storage(_)) {
                    self.repair_counts().await;
                }
                false
            }
        }
    }

    /// Bring cached folder counts back in line after a failed write.
    async fn repair_counts(&self) {
        match self.store.recount_folders().await {
            Ok(true) => warn!("folder counts repaired after failed drop"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "folder count repair failed"),
        }
    }
}
