use super::model::{AnalysisResult, ExecutionMode, OutputMode, SimulationResponse};
use super::state::{PreviewSide, RequestId};
use crate::error::ForgeError;
use std::time::Duration;
use uuid::Uuid;

/// Every state transition the session knows about, user-initiated or not.
#[derive(Debug)]
pub enum Event {
    LoginSubmitted { email: String, password: String },
    LoginCompleted,
    LogoutRequested,

    PromptEdited(String),
    ClearRequested,
    AnalysisTabSelected,
    SimulationTabSelected,
    ToastDismissed,
    ToastExpired(Uuid),

    AnalyzeRequested,
    AnalysisFinished {
        request: RequestId,
        outcome: Result<AnalysisResult, ForgeError>,
    },
    PreviewModeSelected { side: PreviewSide, mode: OutputMode },
    PreviewRequested(PreviewSide),
    ApplyImprovedRequested,
    CopyImprovedRequested,

    SimulateRequested,
    SimulationModeSelected(OutputMode),
    GroundingSet(bool),
    SimulationRunRequested,

    ExecutionFinished {
        request: RequestId,
        slot: ExecutionSlot,
        response: SimulationResponse,
    },
}

/// Which panel an execution result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionSlot {
    Preview(PreviewSide),
    Simulation,
}

/// Work the reducer asks the runtime to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Analyze {
        request: RequestId,
        prompt: String,
    },
    Execute {
        request: RequestId,
        slot: ExecutionSlot,
        prompt: String,
        mode: ExecutionMode,
    },
    CompleteLogin {
        after: Duration,
    },
    ExpireToast {
        id: Uuid,
        after: Duration,
    },
    Ui(UiEffect),
}

/// Effects only the presentation layer can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    ScrollToTop,
    CopyToClipboard(String),
}
