use color_eyre::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;
use weather_tui::{
    app::App,
    config::Config,
    events::EventHandler,
    logging,
    tasks::{self, Services},
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    install_panic_hook(); // Chains onto the color-eyre hook

    let config = Config::load();
    let services = Services::from_config(&config)?;

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(&config);
    let mut events = EventHandler::new(config.ui.tick_rate_ms);

    if let Some(command) = app.on_mount() {
        tasks::spawn(command, &services, events.tx.clone());
    }

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app.snapshot()))?;

        let Some(event) = events.next().await else {
            break;
        };
        if let Some(command) = app.update(event) {
            tasks::spawn(command, &services, events.tx.clone());
        }
    }

    info!("Shutting down");
    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
