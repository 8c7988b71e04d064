#![deny(dead_code)] // DO NOT REMOVE THIS EVER
use anyhow::{anyhow, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use log::{debug, error, info, LevelFilter};
use std::{io, path::PathBuf, time::Duration};
use tokio::sync::mpsc;
use tokio::time::Instant;

mod ui;
mod utils;

use crate::ui::{ChatUI, Flow};
use chatmock::{
    config::{self, Feature, Settings},
    ChatApp,
};

/// How often the input thread checks whether the UI is still listening
const INPUT_POLL: Duration = Duration::from_millis(100);
/// Redraw at least this often even when no timer is pending
const IDLE_WAKEUP: Duration = Duration::from_secs(1);

/// Command line arguments for chatmock
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chatmock: a mock chat client for the terminal.",
    long_about = "chatmock renders a chat screen with contacts, a message thread, \
    media previews, voice notes, stickers and simulated calls. Nothing leaves the process.\n\n\
    Features: calls, group_calls, stickers, media, media_filters, voice_messages, typing_simulation"
)]
struct Args {
    /// Settings file (defaults to <config dir>/chatmock/settings.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to write the log (defaults to ./chatmock.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,

    /// Switch a feature off; may be repeated
    #[arg(long = "disable", value_name = "FEATURE")]
    disable: Vec<Feature>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    save_settings: bool,
}

fn resolve_settings(args: &Args) -> Result<(Settings, Option<PathBuf>)> {
    let path = args.config.clone().or_else(config::default_settings_path);
    let mut settings = match &path {
        Some(path) => config::load_settings(path)?,
        None => Settings::default(),
    };

    for feature in &args.disable {
        settings.features.set(*feature, false);
    }
    if let Some(log_file) = &args.log_file {
        settings.log_file = Some(log_file.clone());
    }
    if let Some(level) = args.log_level {
        settings.log_level = level.to_string();
    }
    Ok((settings, path))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (settings, settings_path) = resolve_settings(&args)?;

    if args.save_settings {
        let path = settings_path.ok_or_else(|| anyhow!("No settings location, pass --config <PATH>"))?;
        config::save_settings(&path, &settings)?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    let log_file_path = settings
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("chatmock.log"));
    let level = settings.log_level.parse().unwrap_or(LevelFilter::Debug);
    utils::setup_logging(&log_file_path, level)?;

    info!("chatmock starting up");
    info!("System information: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Logging to file: {}", log_file_path.display());
    info!("Features: {:?}", settings.features);

    let mut app = ChatApp::new(settings.features);
    let mut chat_ui = ChatUI::new();
    let mut terminal = ui::setup_terminal()?;

    let result = run_main_loop(&mut app, &mut chat_ui, &mut terminal).await;

    // Restore terminal even when the loop failed
    ui::restore_terminal(terminal)?;
    if let Err(e) = &result {
        error!("Main loop failed: {}", e);
    }

    println!("Chat session ended.");
    result
}

/// Forwards terminal events from a plain thread, since crossterm's reader
/// blocks. The thread stops once the receiving side is gone.
fn spawn_input_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to read terminal event: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
        }
        debug!("Input reader stopped");
    });
    rx
}

/// Run the main event loop
async fn run_main_loop(
    app: &mut ChatApp,
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    let mut events = spawn_input_reader();

    loop {
        terminal.draw(|f| chat_ui.draw(f, app))?;

        let wake_at = app
            .next_deadline()
            .unwrap_or_else(|| Instant::now() + IDLE_WAKEUP);

        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    info!("Terminal input closed");
                    break;
                };
                if chat_ui.handle_event(app, event, Instant::now()) == Flow::Quit {
                    info!("Quit requested");
                    break;
                }
            }
            _ = tokio::time::sleep_until(wake_at) => {
                let fired = app.run_due_timers(Instant::now());
                if fired > 0 {
                    debug!("{} timer(s) fired", fired);
                }
            }
        }
    }

    Ok(())
}
