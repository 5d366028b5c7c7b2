use async_trait::async_trait;
use forge_iq::ai::client::GenerateContentResponse;
use forge_iq::ai::gateway::{NO_IMAGE_OUTPUT, TEXT_GENERATION_ERROR};
use forge_iq::config::{ModelSet, Timings};
use forge_iq::core::events::{Event, UiEffect};
use forge_iq::core::model::{DifficultyLevel, OutputMode, Tab};
use forge_iq::core::state::{AnalysisFlow, PreviewSide, RunStatus};
use forge_iq::orchestrator::analysis::APPLIED_IMPROVED;
use forge_iq::orchestrator::simulation::SIMULATION_FAILED;
use forge_iq::{ForgeError, ModelGateway, ModelTransport, Runtime};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

type Handler = dyn Fn(&str, &Value) -> Result<Value, String> + Send + Sync;

/// Answers every call with a handler and remembers what it was asked.
struct Scripted {
    handler: Box<Handler>,
    calls: Mutex<Vec<Value>>,
}

impl Scripted {
    fn new(handler: impl Fn(&str, &Value) -> Result<Value, String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelTransport for Scripted {
    async fn generate_content(
        &self,
        model: &str,
        payload: Value,
    ) -> Result<GenerateContentResponse, ForgeError> {
        let reply = (self.handler)(model, &payload);
        self.calls.lock().unwrap().push(payload);
        match reply {
            Ok(body) => Ok(serde_json::from_value(body)?),
            Err(msg) => Err(ForgeError::GenerationFailed(msg)),
        }
    }
}

fn text_reply(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

fn is_analysis(payload: &Value) -> bool {
    payload
        .pointer("/generationConfig/responseSchema")
        .is_some()
}

const IMPROVED: &str = "You are a specialty-coffee writer. Write an 800-word blog post for home baristas about dialing in espresso.";

fn coffee_analysis() -> String {
    let body = json!({
        "score": 3,
        "level": "Beginner",
        "summary": "A clear topic with no audience, length, or tone.",
        "strengths": ["Concise"],
        "weaknesses": ["No audience", "No format"],
        "suggestions": ["Define the reader", "Set a word count"],
        "improvedPrompt": IMPROVED
    });
    format!("```json\n{body}\n```")
}

async fn signed_in(transport: Arc<Scripted>) -> Runtime {
    let gateway = ModelGateway::new(transport, ModelSet::default());
    let mut runtime = Runtime::new(gateway, Timings::default());
    runtime.dispatch(Event::LoginSubmitted {
        email: "writer@example.com".into(),
        password: "hunter2".into(),
    });
    runtime.settle().await;
    assert!(runtime.state().is_authenticated());
    runtime.dispatch(Event::ToastDismissed);
    runtime
}

#[tokio::test(start_paused = true)]
async fn test_coffee_prompt_analyze_and_apply() {
    let transport = Scripted::new(|_, payload| {
        if is_analysis(payload) {
            Ok(text_reply(&coffee_analysis()))
        } else {
            Ok(text_reply("unused"))
        }
    });
    let mut runtime = signed_in(transport.clone()).await;

    runtime.dispatch(Event::PromptEdited("Write a blog post about coffee".into()));
    runtime.dispatch(Event::AnalyzeRequested);
    assert!(runtime.state().analysis().is_analyzing());
    runtime.settle().await;

    let result = runtime.state().analysis().result().expect("analysis ready").clone();
    assert!(result.score <= 10);
    assert!(matches!(
        result.level,
        DifficultyLevel::Beginner | DifficultyLevel::Intermediate | DifficultyLevel::Advanced
    ));
    assert_eq!(transport.calls().len(), 1);

    runtime.dispatch(Event::ApplyImprovedRequested);
    assert_eq!(runtime.state().prompt(), result.improved_prompt);
    assert_eq!(runtime.state().prompt(), IMPROVED);
    // The analysis of the old prompt stays on screen.
    assert_eq!(runtime.state().analysis().result(), Some(&result));
    assert_eq!(runtime.drain_ui_effects(), vec![UiEffect::ScrollToTop]);
    assert_eq!(runtime.state().toast().unwrap().message, APPLIED_IMPROVED);
}

#[tokio::test(start_paused = true)]
async fn test_grounded_simulation_failure_degrades() {
    let transport = Scripted::new(|_, _| Err("connection reset".into()));
    let mut runtime = signed_in(transport.clone()).await;

    runtime.dispatch(Event::PromptEdited("Latest espresso machine reviews".into()));
    runtime.dispatch(Event::SimulateRequested);
    assert_eq!(runtime.state().tab(), Tab::Simulation);
    runtime.settle().await;

    let panel = runtime.state().simulation();
    assert!(matches!(panel.status, RunStatus::Failed { .. }));
    assert_eq!(panel.output(), Some(TEXT_GENERATION_ERROR));
    assert_eq!(runtime.state().toast().unwrap().message, SIMULATION_FAILED);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["tools"], json!([{ "googleSearch": {} }]));
}

#[tokio::test(start_paused = true)]
async fn test_image_without_inline_data_is_success() {
    let transport = Scripted::new(|model, _| match model {
        "gemini-2.5-flash-image" => Ok(text_reply("I described the image instead.")),
        _ => Ok(text_reply("A swan in the crema.")),
    });
    let mut runtime = signed_in(transport.clone()).await;

    runtime.dispatch(Event::PromptEdited("A latte art swan".into()));
    runtime.dispatch(Event::SimulateRequested);
    // Opening the tab runs once in text mode.
    runtime.settle().await;
    assert_eq!(runtime.state().simulation().output(), Some("A swan in the crema."));

    runtime.dispatch(Event::SimulationModeSelected(OutputMode::Image));
    assert!(!runtime.state().simulation().has_run());
    runtime.dispatch(Event::SimulationRunRequested);
    runtime.settle().await;
    assert_eq!(transport.calls().len(), 2);

    let panel = runtime.state().simulation();
    assert!(matches!(panel.status, RunStatus::Ready { .. }));
    assert_eq!(panel.output(), Some(NO_IMAGE_OUTPUT));
    assert!(runtime.state().toast().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_previews_complete_independently() {
    let transport = Scripted::new(|model, payload| {
        if is_analysis(payload) {
            return Ok(text_reply(&coffee_analysis()));
        }
        if model.ends_with("-image") {
            return Ok(json!({ "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
            ]}}]}));
        }
        Ok(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Coffee, briefly." }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://example.com/coffee", "title": "Coffee" } },
                    { "retrievedContext": {} }
                ]}
            }]
        }))
    });
    let mut runtime = signed_in(transport).await;

    runtime.dispatch(Event::PromptEdited("Write a blog post about coffee".into()));
    runtime.dispatch(Event::AnalyzeRequested);
    runtime.settle().await;

    runtime.dispatch(Event::PreviewModeSelected {
        side: PreviewSide::Improved,
        mode: OutputMode::Image,
    });
    runtime.dispatch(Event::PreviewRequested(PreviewSide::Current));
    runtime.dispatch(Event::PreviewRequested(PreviewSide::Improved));
    assert_eq!(runtime.in_flight(), 2);
    runtime.settle().await;

    let previews = runtime.state().previews();
    assert_eq!(previews.current.output(), Some("Coffee, briefly."));
    assert_eq!(previews.current.sources().len(), 1);
    assert_eq!(previews.current.sources()[0].title, "Coffee");

    let RunStatus::Ready { response, .. } = &previews.improved.status else {
        panic!("improved preview should be ready");
    };
    assert!(response.is_image());
    assert_eq!(response.image_bytes().unwrap().1, b"hello");
}

#[tokio::test(start_paused = true)]
async fn test_clear_discards_in_flight_analysis() {
    let transport = Scripted::new(|_, _| Ok(text_reply(&coffee_analysis())));
    let mut runtime = signed_in(transport).await;

    runtime.dispatch(Event::PromptEdited("Write a blog post about coffee".into()));
    runtime.dispatch(Event::AnalyzeRequested);
    runtime.dispatch(Event::ClearRequested);
    runtime.settle().await;

    let state = runtime.state();
    assert_eq!(state.prompt(), "");
    assert_eq!(state.analysis(), &AnalysisFlow::Idle);
    assert_eq!(state.simulation_prompt(), "");
    assert_eq!(state.tab(), Tab::Analysis);
}

#[tokio::test(start_paused = true)]
async fn test_toast_expires_on_its_own() {
    let transport = Scripted::new(|_, _| Err("unused".into()));
    let gateway = ModelGateway::new(transport, ModelSet::default());
    let mut runtime = Runtime::new(gateway, Timings::default());

    runtime.dispatch(Event::LoginSubmitted {
        email: "a@b.c".into(),
        password: "x".into(),
    });
    runtime.settle().await;
    assert!(runtime.state().toast().is_some());

    // Nothing else is pending, so the next completion is the expiry timer.
    runtime.step().await;
    assert!(runtime.state().toast().is_none());
}
