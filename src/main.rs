use anyhow::{Context, Result};
use idade::clock::{Clock, ClockTicker, SystemClock};
use idade::command::{Command, HELP};
use idade::config::Config;
use idade::form::Form;
use idade::render::Renderer;
use idade::storage::FileStore;
use idade::theme::ThemePreference;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    debug!(?config, "starting");

    // A broken preferences file must not keep the form from starting.
    let store = FileStore::open(&config.storage_path).unwrap_or_else(|e| {
        warn!(error = %e, "theme preference unavailable, starting with defaults");
        FileStore::empty(&config.storage_path)
    });
    let mut theme = ThemePreference::load(store);
    let color = std::io::stdout().is_terminal();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone));
    let mut ticker = ClockTicker::start(clock, config.refresh);
    let mut clock_rx = ticker.subscribe();

    let mut form = Form::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}\n");
    print!(
        "{}",
        Renderer::new(theme.theme(), color).render(&form.snapshot(&ticker.latest()))
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let now = ticker.latest();
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(idade::command::CommandError::Empty) => continue,
                    Err(e) => {
                        println!("{e} (help para ajuda)");
                        continue;
                    }
                };

                match command {
                    Command::Set(field, value) => {
                        form.change(field, value, &now);
                        form.blur(field, &now);
                    }
                    Command::Submit => {
                        form.submit(&now);
                    }
                    Command::Reset => form.reset(),
                    Command::ToggleTheme => {
                        if let Err(e) = theme.toggle() {
                            warn!(error = %e, "failed to save theme preference");
                        }
                    }
                    Command::Show => {}
                    Command::Json => {
                        let json = serde_json::to_string_pretty(&form.snapshot(&now))
                            .context("Failed to serialize form state")?;
                        println!("{json}");
                        continue;
                    }
                    Command::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    Command::Quit => break,
                }

                print!("{}", Renderer::new(theme.theme(), color).render(&form.snapshot(&now)));
            }
            changed = clock_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let now = *clock_rx.borrow_and_update();
                debug!(clock = %now.clock_label(), "clock refreshed");
            }
        }
    }

    ticker.stop();
    Ok(())
}
