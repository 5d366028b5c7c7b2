//! Line-oriented front end: parses commands and prints the session.

use forge_iq::core::events::Event;
use forge_iq::core::model::{OutputMode, ScoreBand, Tab};
use forge_iq::core::state::{
    AnalysisFlow, AuthState, ExecutionPanel, PreviewSide, RunStatus, SessionState, ToastKind,
};

pub const HELP: &str = r#"
Commands:
  <text>                         replace the prompt with <text>
  :append <text>                 add a line to the prompt
  :login <email> <password>      sign in (any non-empty values)
  :logout
  :analyze                       score the prompt
  :apply | :copy                 use / copy the improved prompt
  :preview current|improved      run a preview next to the analysis
  :preview-mode current|improved text|image
  :simulate                      open the simulation tab and run once
  :mode text|image               simulation output mode
  :ground on|off                 web grounding for text simulations
  :run                           re-run the simulation
  :tab analysis|simulation
  :save [current|improved] <path>
                                 write the simulated (or preview) image to disk
  :dismiss | :clear | :help | :quit
"#;

#[derive(Debug)]
pub enum Command {
    Dispatch(Event),
    Append(String),
    Save { side: Option<PreviewSide>, path: String },
    Help,
    Quit,
    Invalid(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Dispatch(Event::PromptEdited(line.to_string()));
    };

    let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let args = args.trim();
    let words: Vec<&str> = args.split_whitespace().collect();

    let event = match (name, words.as_slice()) {
        ("help", _) => return Command::Help,
        ("quit" | "q", _) => return Command::Quit,
        ("append", _) => return Command::Append(args.to_string()),
        ("save", [path]) => {
            return Command::Save {
                side: None,
                path: path.to_string(),
            };
        }
        ("save", [side, path]) => match preview_side(side) {
            Some(side) => {
                return Command::Save {
                    side: Some(side),
                    path: path.to_string(),
                };
            }
            None => return Command::Invalid(line.to_string()),
        },
        ("login", [email, password]) => Event::LoginSubmitted {
            email: email.to_string(),
            password: password.to_string(),
        },
        ("logout", []) => Event::LogoutRequested,
        ("analyze", []) => Event::AnalyzeRequested,
        ("apply", []) => Event::ApplyImprovedRequested,
        ("copy", []) => Event::CopyImprovedRequested,
        ("clear", []) => Event::ClearRequested,
        ("dismiss", []) => Event::ToastDismissed,
        ("simulate", []) => Event::SimulateRequested,
        ("run", []) => Event::SimulationRunRequested,
        ("tab", ["analysis"]) => Event::AnalysisTabSelected,
        ("tab", ["simulation"]) => Event::SimulationTabSelected,
        ("mode", [mode]) => match output_mode(mode) {
            Some(mode) => Event::SimulationModeSelected(mode),
            None => return Command::Invalid(line.to_string()),
        },
        ("ground", ["on"]) => Event::GroundingSet(true),
        ("ground", ["off"]) => Event::GroundingSet(false),
        ("preview", [side]) => match preview_side(side) {
            Some(side) => Event::PreviewRequested(side),
            None => return Command::Invalid(line.to_string()),
        },
        ("preview-mode", [side, mode]) => match (preview_side(side), output_mode(mode)) {
            (Some(side), Some(mode)) => Event::PreviewModeSelected { side, mode },
            _ => return Command::Invalid(line.to_string()),
        },
        _ => return Command::Invalid(line.to_string()),
    };
    Command::Dispatch(event)
}

fn output_mode(word: &str) -> Option<OutputMode> {
    match word {
        "text" => Some(OutputMode::Text),
        "image" => Some(OutputMode::Image),
        _ => None,
    }
}

fn preview_side(word: &str) -> Option<PreviewSide> {
    match word {
        "current" => Some(PreviewSide::Current),
        "improved" => Some(PreviewSide::Improved),
        _ => None,
    }
}

/// Decoded image shown in the simulation panel, or in a preview when `side`
/// is given.
pub fn image_to_save(state: &SessionState, side: Option<PreviewSide>) -> Result<(String, Vec<u8>), &'static str> {
    let panel = match side {
        Some(side) => state.previews().side(side),
        None => state.simulation(),
    };
    let RunStatus::Ready { response, .. } = &panel.status else {
        return Err("No output to save.");
    };
    response.image_bytes().ok_or("The output is not an image.")
}

pub fn render(state: &SessionState) {
    if let Some(toast) = state.toast() {
        let icon = match toast.kind {
            ToastKind::Success => "✅",
            ToastKind::Error => "❌",
            ToastKind::Info => "ℹ️ ",
        };
        println!("{icon} {}", toast.message);
    }

    match state.auth() {
        AuthState::SignedIn => {}
        AuthState::Pending => {
            println!("⏳ Signing in...");
            return;
        }
        AuthState::Rejected(reason) => {
            println!("⚠️  {reason}");
            return;
        }
        AuthState::SignedOut => {
            println!("🔒 Sign in with :login <email> <password>");
            return;
        }
    }

    println!("--------------------------------------------------");
    println!("📝 Prompt ({} chars): {}", state.prompt().len(), state.prompt());

    match state.tab() {
        Tab::Analysis => render_analysis(state),
        Tab::Simulation => {
            println!("[ Analysis ] [*Simulation*]");
            println!("Prompt context: {}", state.simulation_prompt());
            let panel = state.simulation();
            let mode = match panel.mode {
                OutputMode::Text => format!("text, grounding {}", if panel.grounding { "on" } else { "off" }),
                OutputMode::Image => "image".to_string(),
            };
            println!("Mode: {mode}{}", if panel.has_run() { "" } else { " (not run)" });
            render_panel("Output", panel);
        }
    }
}

fn render_analysis(state: &SessionState) {
    println!("[*Analysis*] [ Simulation ]");
    match state.analysis() {
        AnalysisFlow::Idle => println!("No analysis yet. Type a prompt and run :analyze."),
        AnalysisFlow::Analyzing { .. } => println!("Analysing structure, clarity, and effectiveness..."),
        AnalysisFlow::Ready(result) => {
            let band = match result.score_band() {
                ScoreBand::High => "🟢",
                ScoreBand::Medium => "🟡",
                ScoreBand::Low => "🔴",
            };
            println!("{band} Score: {}/10   Level: {}", result.score, result.level);
            println!("{}", result.summary);
            print_list("Strengths", &result.strengths);
            print_list("Weaknesses", &result.weaknesses);
            print_list("Suggestions", &result.suggestions);
            println!("✨ Improved prompt:\n{}", result.improved_prompt);
            render_panel("Current output", &state.previews().current);
            render_panel("Improved output", &state.previews().improved);
        }
    }
}

fn print_list(title: &str, items: &[String]) {
    println!("{title}:");
    for item in items {
        println!("  • {item}");
    }
}

fn render_panel(title: &str, panel: &ExecutionPanel) {
    if panel.is_running() {
        println!("{title}: generating...");
        return;
    }
    let Some(output) = panel.output() else {
        return;
    };
    if output.starts_with("data:image") {
        println!("{title}: 🖼️  image ({} bytes encoded, :save <path> to write it)", output.len());
    } else {
        println!("{title}:\n{output}");
    }
    for source in panel.sources() {
        println!("  🌐 {} <{}>", source.title, source.uri);
    }
}
