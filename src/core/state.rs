//! Session State Store.
//!
//! One `SessionState` holds everything the screen shows. Each asynchronous
//! flow owns a disjoint slice (`analysis`, `previews.current`,
//! `previews.improved`, `simulation`) and tags its in-flight call with a
//! `RequestId`; a completion is only accepted by the slice that is still
//! waiting on that exact id.

use super::model::{AnalysisResult, ExecutionMode, OutputMode, SimulationResponse, Tab, WebSource};
use crate::config::Timings;
use uuid::Uuid;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    /// Form was rejected before the simulated round trip.
    Rejected(String),
    Pending,
    SignedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisFlow {
    #[default]
    Idle,
    Analyzing {
        request: RequestId,
    },
    Ready(AnalysisResult),
}

impl AnalysisFlow {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisFlow::Ready(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisFlow::Analyzing { .. })
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        matches!(self, AnalysisFlow::Analyzing { request } if *request == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running {
        request: RequestId,
        mode: ExecutionMode,
    },
    Ready {
        response: SimulationResponse,
        mode: ExecutionMode,
    },
    Failed {
        message: String,
        mode: ExecutionMode,
    },
}

/// One output panel: a mode selector plus the state of its latest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPanel {
    pub mode: OutputMode,
    pub grounding: bool,
    pub status: RunStatus,
}

impl Default for ExecutionPanel {
    fn default() -> Self {
        Self {
            mode: OutputMode::Text,
            grounding: true,
            status: RunStatus::Idle,
        }
    }
}

impl ExecutionPanel {
    pub fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::resolve(self.mode, self.grounding)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running { .. })
    }

    /// Whether the shown (or pending) output was produced with the current
    /// mode and grounding settings.
    pub fn has_run(&self) -> bool {
        let current = self.execution_mode();
        match &self.status {
            RunStatus::Idle => false,
            RunStatus::Running { mode, .. }
            | RunStatus::Ready { mode, .. }
            | RunStatus::Failed { mode, .. } => *mode == current,
        }
    }

    pub fn output(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Ready { response, .. } => Some(response.content.as_str()),
            RunStatus::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn sources(&self) -> &[WebSource] {
        match &self.status {
            RunStatus::Ready { response, .. } => response.sources(),
            _ => &[],
        }
    }

    pub(crate) fn begin(&mut self, request: RequestId) -> ExecutionMode {
        let mode = self.execution_mode();
        self.status = RunStatus::Running { request, mode };
        mode
    }

    /// Stores a completion. Returns `None` when the panel is no longer
    /// waiting on `request`, otherwise whether the run degraded.
    pub(crate) fn finish(&mut self, request: RequestId, response: SimulationResponse) -> Option<bool> {
        let mode = match self.status {
            RunStatus::Running { request: pending, mode } if pending == request => mode,
            _ => return None,
        };
        let failed = response.failed;
        self.status = if failed {
            RunStatus::Failed {
                message: response.content,
                mode,
            }
        } else {
            RunStatus::Ready { response, mode }
        };
        Some(failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSide {
    Current,
    Improved,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Previews {
    pub current: ExecutionPanel,
    pub improved: ExecutionPanel,
}

impl Previews {
    pub fn side(&self, side: PreviewSide) -> &ExecutionPanel {
        match side {
            PreviewSide::Current => &self.current,
            PreviewSide::Improved => &self.improved,
        }
    }

    pub(crate) fn side_mut(&mut self, side: PreviewSide) -> &mut ExecutionPanel {
        match side {
            PreviewSide::Current => &mut self.current,
            PreviewSide::Improved => &mut self.improved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) auth: AuthState,
    pub(crate) prompt: String,
    pub(crate) tab: Tab,
    pub(crate) analysis: AnalysisFlow,
    pub(crate) previews: Previews,
    pub(crate) simulation_prompt: String,
    pub(crate) simulation: ExecutionPanel,
    pub(crate) toast: Option<Toast>,
    pub(crate) timings: Timings,
    next_request: RequestId,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Timings::default())
    }
}

impl SessionState {
    pub fn new(timings: Timings) -> Self {
        Self {
            auth: AuthState::default(),
            prompt: String::new(),
            tab: Tab::Analysis,
            analysis: AnalysisFlow::Idle,
            previews: Previews::default(),
            simulation_prompt: String::new(),
            simulation: ExecutionPanel::default(),
            toast: None,
            timings,
            next_request: 0,
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth == AuthState::SignedIn
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn analysis(&self) -> &AnalysisFlow {
        &self.analysis
    }

    pub fn previews(&self) -> &Previews {
        &self.previews
    }

    pub fn simulation_prompt(&self) -> &str {
        &self.simulation_prompt
    }

    pub fn simulation(&self) -> &ExecutionPanel {
        &self.simulation
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn set_analysis(&mut self, analysis: AnalysisFlow) {
        self.analysis = analysis;
    }

    /// Resets the editor and every result in one step.
    pub fn clear(&mut self) {
        self.prompt.clear();
        self.analysis = AnalysisFlow::Idle;
        self.previews = Previews::default();
        self.simulation_prompt.clear();
        self.simulation = ExecutionPanel::default();
        self.tab = Tab::Analysis;
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::DifficultyLevel;

    fn result() -> AnalysisResult {
        AnalysisResult {
            score: 7,
            level: DifficultyLevel::Advanced,
            summary: "s".into(),
            strengths: vec![],
            weaknesses: vec![],
            suggestions: vec![],
            improved_prompt: "better".into(),
        }
    }

    #[test]
    fn test_clear_resets_everything_but_auth() {
        let mut state = SessionState::default();
        state.auth = AuthState::SignedIn;
        state.set_prompt("draft");
        state.set_tab(Tab::Simulation);
        state.set_analysis(AnalysisFlow::Ready(result()));
        state.simulation_prompt = "draft".into();
        state.simulation.status = RunStatus::Running {
            request: 3,
            mode: ExecutionMode::Image,
        };

        state.clear();

        assert_eq!(state.prompt(), "");
        assert_eq!(state.analysis(), &AnalysisFlow::Idle);
        assert_eq!(state.simulation_prompt(), "");
        assert_eq!(state.tab(), Tab::Analysis);
        assert_eq!(state.simulation(), &ExecutionPanel::default());
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_request_ids_are_monotonic() {
        let mut state = SessionState::default();
        let a = state.next_request_id();
        let b = state.next_request_id();
        assert!(b > a);
    }

    #[test]
    fn test_panel_finish_ignores_foreign_request() {
        let mut panel = ExecutionPanel::default();
        let mode = panel.begin(5);
        assert_eq!(mode, ExecutionMode::Text { grounding: true });
        assert_eq!(panel.finish(4, SimulationResponse::text("old")), None);
        assert!(panel.is_running());
        assert_eq!(panel.finish(5, SimulationResponse::text("new")), Some(false));
        assert_eq!(panel.output(), Some("new"));
        assert_eq!(panel.finish(5, SimulationResponse::text("again")), None);
    }

    #[test]
    fn test_panel_degraded_run_is_failed() {
        let mut panel = ExecutionPanel::default();
        panel.begin(1);
        assert_eq!(panel.finish(1, SimulationResponse::degraded("broken")), Some(true));
        assert!(matches!(panel.status, RunStatus::Failed { .. }));
        assert_eq!(panel.output(), Some("broken"));
        assert!(panel.sources().is_empty());
    }

    #[test]
    fn test_has_run_tracks_settings() {
        let mut panel = ExecutionPanel::default();
        assert!(!panel.has_run());
        panel.begin(1);
        panel.finish(1, SimulationResponse::text("x"));
        assert!(panel.has_run());

        panel.grounding = false;
        assert!(!panel.has_run());
        panel.grounding = true;
        assert!(panel.has_run());

        panel.mode = OutputMode::Image;
        assert!(!panel.has_run());
    }
}
