mod app;
mod cli;
mod clipboard;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hadith_core::{ChatSession, Config, GeminiClient, SqliteStorage, VerificationClient};
use tracing::info;

use app::{App, Verifier};
use handler::handle_event;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "hadith")]
#[command(version, about = "Verify hadith authenticity against the classical collections")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a single hadith text and print the verdict
    Verify {
        /// The hadith text, or part of it
        text: String,
    },
    /// Print the saved conversation
    History,
    /// Clear the saved conversation
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn build_verifier(config: &Config) -> Result<Verifier> {
    let client = GeminiClient::new(config.gemini_settings()?)?;
    Ok(VerificationClient::new(client, config.retry_policy()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        None => run_tui(config).await,
        Some(Commands::Verify { text }) => {
            logging::init_stderr(config.log_level());
            let verifier = build_verifier(&config)?;
            cli::verify(&verifier, &text).await
        }
        Some(Commands::History) => {
            logging::init_stderr(config.log_level());
            cli::history()
        }
        Some(Commands::Reset { yes }) => {
            logging::init_stderr(config.log_level());
            cli::reset(yes)
        }
    }
}

async fn run_tui(config: Config) -> Result<()> {
    logging::init_file(config.log_level())?;

    // Fail on a missing API key before the terminal is taken over
    let verifier = build_verifier(&config)?;
    let session = ChatSession::load(Box::new(SqliteStorage::open_default()?));
    let mut app = App::new(session, verifier, config.model());

    info!(model = config.model(), "Starting TUI");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
