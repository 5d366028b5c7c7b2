//! Reducers that turn events into state changes plus follow-up effects.
//!
//! Session-level events (login, editing, tabs, toasts) are handled here; the
//! analysis and simulation flows live in their own modules.

pub mod analysis;
pub mod simulation;

use crate::core::events::{Effect, Event, ExecutionSlot};
use crate::core::model::Tab;
use crate::core::state::{AuthState, SessionState, Toast, ToastKind};
use uuid::Uuid;

pub const WELCOME: &str = "Welcome to ForgeIQ";
pub const FILL_IN_ALL_FIELDS: &str = "Please fill in all fields";

pub fn reduce(state: &mut SessionState, event: Event) -> Vec<Effect> {
    match event {
        Event::LoginSubmitted { email, password } => submit_login(state, &email, &password),
        Event::LoginCompleted => complete_login(state),
        Event::ToastDismissed => {
            state.toast = None;
            Vec::new()
        }
        Event::ToastExpired(id) => {
            if state.toast.as_ref().is_some_and(|t| t.id == id) {
                state.toast = None;
            }
            Vec::new()
        }
        other if !state.is_authenticated() => {
            log::debug!("Ignoring {other:?} while signed out");
            Vec::new()
        }
        event => reduce_signed_in(state, event),
    }
}

fn reduce_signed_in(state: &mut SessionState, event: Event) -> Vec<Effect> {
    match event {
        Event::LogoutRequested => {
            log::info!("👋 Logged out");
            state.auth = AuthState::SignedOut;
            state.clear();
            Vec::new()
        }
        Event::PromptEdited(text) => {
            state.set_prompt(text);
            Vec::new()
        }
        Event::ClearRequested => {
            state.clear();
            Vec::new()
        }
        Event::AnalysisTabSelected => {
            state.set_tab(Tab::Analysis);
            Vec::new()
        }
        Event::SimulationTabSelected => simulation::select_tab(state),

        Event::AnalyzeRequested => analysis::start(state),
        Event::AnalysisFinished { request, outcome } => analysis::finish(state, request, outcome),
        Event::PreviewModeSelected { side, mode } => {
            analysis::select_preview_mode(state, side, mode);
            Vec::new()
        }
        Event::PreviewRequested(side) => analysis::run_preview(state, side),
        Event::ApplyImprovedRequested => analysis::apply_improved(state),
        Event::CopyImprovedRequested => analysis::copy_improved(state),

        Event::SimulateRequested => simulation::launch(state),
        Event::SimulationModeSelected(mode) => {
            simulation::select_mode(state, mode);
            Vec::new()
        }
        Event::GroundingSet(enabled) => {
            simulation::set_grounding(state, enabled);
            Vec::new()
        }
        Event::SimulationRunRequested => simulation::run(state),

        Event::ExecutionFinished { request, slot, response } => match slot {
            ExecutionSlot::Preview(side) => analysis::finish_preview(state, side, request, response),
            ExecutionSlot::Simulation => simulation::finish(state, request, response),
        },

        Event::LoginSubmitted { .. }
        | Event::LoginCompleted
        | Event::ToastDismissed
        | Event::ToastExpired(_) => Vec::new(),
    }
}

fn submit_login(state: &mut SessionState, email: &str, password: &str) -> Vec<Effect> {
    if matches!(state.auth, AuthState::Pending | AuthState::SignedIn) {
        return Vec::new();
    }
    if email.trim().is_empty() || password.is_empty() {
        state.auth = AuthState::Rejected(FILL_IN_ALL_FIELDS.to_string());
        return Vec::new();
    }
    state.auth = AuthState::Pending;
    vec![Effect::CompleteLogin {
        after: state.timings.login_delay,
    }]
}

fn complete_login(state: &mut SessionState) -> Vec<Effect> {
    if state.auth != AuthState::Pending {
        return Vec::new();
    }
    log::info!("🔓 Signed in");
    state.auth = AuthState::SignedIn;
    vec![notify(state, ToastKind::Success, WELCOME)]
}

/// Replaces the visible toast and schedules its expiry.
pub(crate) fn notify(state: &mut SessionState, kind: ToastKind, message: &str) -> Effect {
    let id = Uuid::new_v4();
    state.toast = Some(Toast {
        id,
        kind,
        message: message.to_string(),
    });
    Effect::ExpireToast {
        id,
        after: state.timings.toast,
    }
}
