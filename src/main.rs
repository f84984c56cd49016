use std::io;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{backend::CrosstermBackend, Terminal};

use billing_console::{
    api::BillingClient,
    app::{run_app, App},
    config::{self, Args},
    session::{FileSessionStore, SessionContext},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init(Args::parse())?;
    telemetry::init(config.log_file())?;
    tracing::info!(api = config.api_url(), "starting billing console");

    let client = BillingClient::new(config.api_url())?;
    let session = SessionContext::new(Box::new(FileSessionStore::new(config.session_file())));

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, client, session);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "console stopped");
        println!("Error: {}", err);
    }

    Ok(())
}
