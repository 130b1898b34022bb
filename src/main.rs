use anyhow::Result;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use securecomm::app::action::Action;
use securecomm::app::event::AppEvent;
use securecomm::app::handler;
use securecomm::app::session::Session;
use securecomm::app::state::*;
use securecomm::net::Credential;
use securecomm::{config, logging, ui};
use std::io;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let cfg = config::load_config()?;
    if let Some(path) = logging::init(&cfg.logging)? {
        info!(log = %path.display(), "securecomm starting");
    }
    // First run: write the defaults out so there is a file to edit
    if !config::config_path().exists() {
        if let Err(e) = config::save_config(&cfg) {
            warn!(error = %format!("{:#}", e), "could not write default config");
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, cfg).await;

    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();
    // Sessions are opened on a background task and handed back here
    let (session_tx, mut session_rx) = mpsc::unbounded_channel::<Session>();
    let mut session: Option<Session> = None;

    let mut state = AppState::new(cfg.clone());

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if term_tx.send(AppEvent::Terminal(event)).is_err() {
                break;
            }
        }
    });

    // Spawn tick task (4 FPS is plenty without animations)
    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    terminal.draw(|f| ui::render(f, &state))?;

    // Main event loop
    loop {
        let Some(event) = event_rx.recv().await else {
            break;
        };

        while let Ok(opened) = session_rx.try_recv() {
            if state.is_current(opened.id()) {
                if let Some(old) = session.replace(opened) {
                    tokio::spawn(old.close());
                }
            } else {
                // The login was abandoned while this session was opening
                tokio::spawn(opened.close());
            }
        }

        let actions = handler::handle_event(&mut state, event);

        for action in actions {
            match action {
                Action::Login {
                    session: id,
                    username,
                    password,
                } => {
                    if let Some(old) = session.take() {
                        tokio::spawn(old.close());
                    }
                    let options = cfg.server.connect_options();
                    let address = cfg.server.address.clone();
                    let credential = Credential::new(username, password);
                    let tx = event_tx.clone();
                    let session_tx = session_tx.clone();
                    tokio::spawn(async move {
                        match Session::open(id, options, &address, credential, tx.clone()).await {
                            Ok(opened) => {
                                if let Err(e) = session_tx.send(opened) {
                                    tokio::spawn(e.0.close());
                                    return;
                                }
                                let _ = tx.send(AppEvent::Connected(id));
                            }
                            Err(e) => {
                                warn!(session = id, error = %format!("{:#}", e), "login failed");
                                let _ = tx.send(AppEvent::ConnectFailed(id, format!("{:#}", e)));
                            }
                        }
                    });
                }
                Action::Send { text } => match &session {
                    Some(active) => {
                        if !active.send(text) {
                            state.error_message("Message not sent: session closed");
                        }
                    }
                    None => state.error_message("Not connected"),
                },
                Action::Disconnect => {
                    if let Some(active) = session.take() {
                        tokio::spawn(active.close());
                    }
                }
                Action::Quit => {
                    state.should_quit = true;
                }
            }
        }

        if state.should_quit {
            if let Some(active) = session.take() {
                active.close().await;
            }
            break;
        }

        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    info!("securecomm exiting");
    Ok(())
}
