//! Analysis Orchestrator.
//!
//! `Idle -> Analyzing -> Ready`, falling back to `Idle` on failure. Also runs
//! the two side-by-side previews (live prompt vs. improved prompt), each with
//! its own mode and its own request id.

use super::notify;
use crate::core::events::{Effect, ExecutionSlot, UiEffect};
use crate::core::model::{AnalysisResult, OutputMode, SimulationResponse, Tab};
use crate::core::state::{AnalysisFlow, PreviewSide, Previews, RequestId, SessionState, ToastKind};
use crate::error::ForgeError;

pub const ANALYSIS_FAILED: &str = "Analysis failed. Please try again.";
pub const PREVIEW_FAILED: &str = "Failed to generate output";
pub const APPLIED_IMPROVED: &str = "Applied improved prompt to editor";
pub const COPIED: &str = "Copied to clipboard!";

pub(crate) fn start(state: &mut SessionState) -> Vec<Effect> {
    if state.prompt.trim().is_empty() {
        log::debug!("Analyze ignored: empty prompt");
        return Vec::new();
    }
    if state.analysis.is_analyzing() {
        log::debug!("Analyze ignored: already analyzing");
        return Vec::new();
    }

    let request = state.next_request_id();
    state.set_tab(Tab::Analysis);
    state.set_analysis(AnalysisFlow::Analyzing { request });
    state.previews = Previews::default();

    log::info!("🔍 Analyzing prompt (request #{request}, {} chars)", state.prompt.len());
    vec![Effect::Analyze {
        request,
        prompt: state.prompt.clone(),
    }]
}

pub(crate) fn finish(
    state: &mut SessionState,
    request: RequestId,
    outcome: Result<AnalysisResult, ForgeError>,
) -> Vec<Effect> {
    if !state.analysis.awaits(request) {
        log::debug!("Discarding stale analysis #{request}");
        return Vec::new();
    }

    match outcome {
        Ok(result) => {
            log::info!("✅ Analysis #{request} ready: {}/10 ({})", result.score, result.level);
            state.set_analysis(AnalysisFlow::Ready(result));
            Vec::new()
        }
        Err(e) => {
            log::warn!("Analysis #{request} failed: {e}");
            state.set_analysis(AnalysisFlow::Idle);
            vec![notify(state, ToastKind::Error, ANALYSIS_FAILED)]
        }
    }
}

pub(crate) fn select_preview_mode(state: &mut SessionState, side: PreviewSide, mode: OutputMode) {
    state.previews.side_mut(side).mode = mode;
}

pub(crate) fn run_preview(state: &mut SessionState, side: PreviewSide) -> Vec<Effect> {
    let Some(result) = state.analysis.result() else {
        log::debug!("Preview ignored: no analysis to preview");
        return Vec::new();
    };

    let prompt = match side {
        PreviewSide::Current => state.prompt.clone(),
        PreviewSide::Improved => result.improved_prompt.clone(),
    };
    if prompt.trim().is_empty() || state.previews.side(side).is_running() {
        return Vec::new();
    }

    let request = state.next_request_id();
    let mode = state.previews.side_mut(side).begin(request);
    log::info!("▶️  Preview {side:?} #{request} ({mode:?})");

    vec![Effect::Execute {
        request,
        slot: ExecutionSlot::Preview(side),
        prompt,
        mode,
    }]
}

pub(crate) fn finish_preview(
    state: &mut SessionState,
    side: PreviewSide,
    request: RequestId,
    response: SimulationResponse,
) -> Vec<Effect> {
    match state.previews.side_mut(side).finish(request, response) {
        None => {
            log::debug!("Discarding stale preview {side:?} #{request}");
            Vec::new()
        }
        Some(true) => vec![notify(state, ToastKind::Error, PREVIEW_FAILED)],
        Some(false) => Vec::new(),
    }
}

/// Copies the improved prompt into the editor. The analysis deliberately
/// stays visible even though it now describes the previous text.
pub(crate) fn apply_improved(state: &mut SessionState) -> Vec<Effect> {
    let Some(improved) = state.analysis.result().map(|r| r.improved_prompt.clone()) else {
        return Vec::new();
    };
    state.set_prompt(improved);
    vec![
        Effect::Ui(UiEffect::ScrollToTop),
        notify(state, ToastKind::Success, APPLIED_IMPROVED),
    ]
}

pub(crate) fn copy_improved(state: &mut SessionState) -> Vec<Effect> {
    let Some(improved) = state.analysis.result().map(|r| r.improved_prompt.clone()) else {
        return Vec::new();
    };
    vec![
        Effect::Ui(UiEffect::CopyToClipboard(improved)),
        notify(state, ToastKind::Success, COPIED),
    ]
}
