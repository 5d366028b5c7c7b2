//! Simulation Orchestrator.
//!
//! Launching snapshots the live prompt, mounts a fresh panel and runs it once.
//! After that, changing the mode or the grounding toggle only marks the output
//! as out of date; a new run has to be requested explicitly.

use super::notify;
use crate::core::events::{Effect, ExecutionSlot};
use crate::core::model::{OutputMode, SimulationResponse, Tab};
use crate::core::state::{ExecutionPanel, RequestId, SessionState, ToastKind};

pub const SIMULATION_FAILED: &str = "Simulation failed";
pub const ENTER_PROMPT_FIRST: &str = "Please enter a prompt first";

/// The "Simulate" action.
pub(crate) fn launch(state: &mut SessionState) -> Vec<Effect> {
    if state.prompt.trim().is_empty() {
        return Vec::new();
    }
    open(state)
}

/// Clicking the simulation tab header.
pub(crate) fn select_tab(state: &mut SessionState) -> Vec<Effect> {
    if state.prompt.is_empty() {
        return vec![notify(state, ToastKind::Info, ENTER_PROMPT_FIRST)];
    }
    open(state)
}

fn open(state: &mut SessionState) -> Vec<Effect> {
    state.simulation_prompt = state.prompt.clone();
    if state.tab == Tab::Simulation {
        // Already mounted: the new snapshot waits for an explicit run.
        return Vec::new();
    }
    state.set_tab(Tab::Simulation);
    state.simulation = ExecutionPanel::default();
    run(state)
}

pub(crate) fn select_mode(state: &mut SessionState, mode: OutputMode) {
    if state.simulation.mode != mode {
        log::debug!("Simulation mode -> {mode:?}");
        state.simulation.mode = mode;
    }
}

pub(crate) fn set_grounding(state: &mut SessionState, enabled: bool) {
    state.simulation.grounding = enabled;
}

pub(crate) fn run(state: &mut SessionState) -> Vec<Effect> {
    if state.simulation_prompt.trim().is_empty() || state.simulation.is_running() {
        return Vec::new();
    }

    let request = state.next_request_id();
    let mode = state.simulation.begin(request);
    log::info!("🧪 Simulation #{request} ({mode:?})");

    vec![Effect::Execute {
        request,
        slot: ExecutionSlot::Simulation,
        prompt: state.simulation_prompt.clone(),
        mode,
    }]
}

pub(crate) fn finish(state: &mut SessionState, request: RequestId, response: SimulationResponse) -> Vec<Effect> {
    match state.simulation.finish(request, response) {
        None => {
            log::debug!("Discarding stale simulation #{request}");
            Vec::new()
        }
        Some(true) => {
            log::warn!("Simulation #{request} degraded");
            vec![notify(state, ToastKind::Error, SIMULATION_FAILED)]
        }
        Some(false) => Vec::new(),
    }
}
