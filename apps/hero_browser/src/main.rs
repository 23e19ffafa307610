use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog_client::{
    config::{load_settings, load_settings_from},
    ControllerEvent, QueryController,
};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{page_move_allowed, parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Search and page through the hero catalog")]
struct Args {
    /// Settings file; defaults to ./hero_browser.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    public_key: Option<String>,
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_settings(),
    };
    if let Some(v) = args.api_url {
        settings.api_url = v;
    }
    if let Some(v) = args.public_key {
        settings.public_key = Some(v);
    }
    if let Some(v) = args.debounce_ms {
        settings.debounce_ms = v;
    }
    if settings.public_key.is_none() {
        warn!("no public key configured; the catalog will likely reject requests");
    }

    let config = settings
        .controller_config()
        .context("invalid catalog settings")?;
    let controller = QueryController::with_http_transport(config)?;
    info!(sizes = ?controller.allowed_page_sizes(), "hero browser ready");
    println!("{HELP}");

    let printer = tokio::spawn(print_events(controller.subscribe_events()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            Command::Search(text) => controller.set_search(text),
            Command::ClearSearch => controller.set_search(""),
            Command::MovePage(delta) => {
                match page_move_allowed(controller.page(), delta, controller.total_pages()) {
                    Ok(()) => controller.move_page(delta),
                    Err(message) => println!("{message}"),
                }
            }
            Command::PageSize(size) => {
                if let Err(err) = controller.set_page_size(size) {
                    println!("{err}");
                }
            }
            Command::Show => match controller.latest_response() {
                Some(response) => {
                    println!("{}", render::page_summary(&controller.state(), &response));
                    for line in render::hero_lines(&response) {
                        println!("{line}");
                    }
                }
                None => println!("no results yet"),
            },
            Command::Stats => println!("{:?}", controller.fetch_stats()),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    drop(controller);
    let _ = printer.await;
    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<ControllerEvent>) {
    loop {
        match events.recv().await {
            Ok(ControllerEvent::ResponseApplied {
                state, response, ..
            }) => {
                println!("{}", render::page_summary(&state, &response));
                for line in render::hero_lines(&response) {
                    println!("{line}");
                }
            }
            Ok(ControllerEvent::FetchFailed(failure)) => {
                println!(
                    "request for page {} failed: {}",
                    failure.state.display_page(),
                    failure.message
                );
            }
            Ok(ControllerEvent::FetchStarted { state, .. }) => {
                println!("loading page {}...", state.display_page());
            }
            Ok(ControllerEvent::StateChanged(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "event printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
