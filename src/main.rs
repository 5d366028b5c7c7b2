mod terminal;

use dotenv::dotenv;
use forge_iq::core::events::{Event, UiEffect};
use forge_iq::core::state::PreviewSide;
use forge_iq::{ForgeConfig, GeminiClient, ModelGateway, Runtime};
use std::sync::Arc;
use terminal::Command;
use tokio::io::{AsyncBufReadExt, BufReader};

enum Input {
    Line(Option<String>),
    Completion,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = ForgeConfig::from_env()?;
    let client = GeminiClient::from_config(&config)?;
    let gateway = ModelGateway::new(Arc::new(client), config.models.clone());
    let mut runtime = Runtime::new(gateway, config.timings);

    println!("🔥 FORGE-IQ PROMPT STUDIO");
    println!("Type :help for commands.\n");
    terminal::render(runtime.state());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            _ = runtime.step() => Input::Completion,
        };

        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match terminal::parse(&line) {
                Command::Quit => break,
                Command::Help => {
                    println!("{}", terminal::HELP);
                    continue;
                }
                Command::Invalid(text) => {
                    eprintln!("Unknown command: {text} (try :help)");
                    continue;
                }
                Command::Save { side, path } => {
                    save_image(&runtime, side, &path);
                    continue;
                }
                Command::Append(text) => {
                    let prompt = match runtime.state().prompt() {
                        "" => text,
                        current => format!("{current}\n{text}"),
                    };
                    runtime.dispatch(Event::PromptEdited(prompt));
                }
                Command::Dispatch(event) => runtime.dispatch(event),
            },
            Input::Completion => {}
        }

        for effect in runtime.drain_ui_effects() {
            match effect {
                UiEffect::ScrollToTop => print!("\x1B[2J\x1B[H"),
                UiEffect::CopyToClipboard(text) => println!("📋 Copied:\n{text}"),
            }
        }
        terminal::render(runtime.state());
    }

    if runtime.in_flight() > 0 {
        log::info!("Exiting with {} request(s) still pending", runtime.in_flight());
    }
    Ok(())
}

fn save_image(runtime: &Runtime, side: Option<PreviewSide>, path: &str) {
    let (mime, bytes) = match terminal::image_to_save(runtime.state(), side) {
        Ok(image) => image,
        Err(reason) => {
            eprintln!("{reason}");
            return;
        }
    };
    match std::fs::write(path, &bytes) {
        Ok(()) => println!("💾 Saved {mime} ({} bytes) to '{path}'", bytes.len()),
        Err(e) => eprintln!("❌ Failed to write '{path}': {e}"),
    }
}
