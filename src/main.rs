mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use aura_core::checklist;
use aura_core::{ChatResponse, Config};
use clap::{Parser, Subcommand};

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "aura")]
#[command(about = "AURA-Lite: terminal support assistant for your internet service")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs here instead of the config directory
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one message and print the assistant's reply as JSON
    Ask {
        /// What you would type in the chat
        text: String,
    },
    /// List the self-help guides and their steps
    Guides,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => logging::default_log_path()?,
    };
    logging::init(&log_path)?;

    // A broken config file shouldn't keep the app from starting
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("could not load config")
    .unwrap_or_else(|e| {
        tracing::warn!("{:#}, using defaults", e);
        Config::new()
    });

    match cli.command {
        Some(Commands::Ask { text }) => ask(&config, &text),
        Some(Commands::Guides) => {
            list_guides();
            Ok(())
        }
        None => run_tui(config).await,
    }
}

fn ask(config: &Config, text: &str) -> Result<()> {
    let reply: ChatResponse = config.rule_set().classify(text).into();
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

fn list_guides() {
    for guide in checklist::seed_guides() {
        println!(
            "{} ({}) {}/{} done",
            guide.title,
            guide.id,
            checklist::completed_count(&guide),
            guide.steps.len()
        );
        println!("  {}", guide.description);
        for step in &guide.steps {
            println!("  {}. {} - {}", step.id, step.title, step.description);
        }
        println!();
    }
}

async fn run_tui(config: Config) -> Result<()> {
    tracing::info!("starting AURA-Lite");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new(tui::TICK_RATE);
    let mut app = App::new(config, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("AURA-Lite closed");
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;
        app.poll_tasks().await;
    }
    Ok(())
}
