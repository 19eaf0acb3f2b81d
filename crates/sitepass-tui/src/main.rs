//! sitepass-tui: interactive site password generator
//!
//! Form for salt, master password and host; the result panel clears itself
//! after `reveal.seconds`.

mod app;
mod derive;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use sitepass_core::config::{default_config_path, expand_tilde, SitepassConfig};
use sitepass_core::logging::{init_logging, LogTarget};
use sitepass_crypto::Generator;

use app::App;
use derive::AppEvent;

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config_path: PathBuf,
    salt: Option<String>,
}

fn parse_args(args: &[String]) -> Args {
    let mut config_path = default_config_path();
    let mut salt = std::env::var("SITEPASS_SALT").ok();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = expand_tilde(&PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--salt" | "-s" => {
                if i + 1 < args.len() {
                    salt = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => {
                i += 1;
            }
        }
    }

    Args { config_path, salt }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args);

    let config = SitepassConfig::load(&args.config_path)
        .with_context(|| format!("loading {}", args.config_path.display()))?;
    // stderr belongs to the terminal UI
    init_logging(&config.log, LogTarget::FileOnly)?;

    let generator = Generator::from_config(&config.kdf);
    let tick = Duration::from_millis(config.reveal.tick_ms);

    // Set up terminal
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    // Panic hook: restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        original_hook(info);
    }));

    let mut app = App::new(config, args.salt);

    let (tx, mut rx) = mpsc::channel::<AppEvent>(16);
    tokio::spawn(derive::ticker(tick, tx.clone()));

    // Main event loop
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        // Drain derivation results and ticks
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if event::poll(Duration::from_millis(100)).context("event poll")? {
            if let Event::Key(key) = event::read().context("event read")? {
                app.handle_key(key);
            }
        }

        if let Some((master, request)) = app.take_request() {
            derive::spawn_generation(&generator, master, request, tx.clone());
        }

        if app.should_quit {
            break;
        }
    }

    // Erase anything still on screen before leaving
    app.clear_now();
    terminal.draw(|f| ui::draw(f, &app))?;

    // Restore terminal
    disable_raw_mode().context("disable raw mode")?;
    io::stdout()
        .execute(LeaveAlternateScreen)
        .context("leave alternate screen")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("sitepass-tui")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(&argv(&["--config", "/tmp/sp.toml", "--salt", "pepper"]));
        assert_eq!(args.config_path, PathBuf::from("/tmp/sp.toml"));
        assert_eq!(args.salt.as_deref(), Some("pepper"));
    }

    #[test]
    fn test_parse_args_ignores_unknown_and_dangling() {
        let args = parse_args(&argv(&["--verbose", "-c"]));
        assert_eq!(args.config_path, default_config_path());
    }
}
