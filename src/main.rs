//! Countdown - a countdown timer with start, pause and stop controls
//!
//! This is the terminal front-end: it prints a line per session change and
//! reads control commands from stdin.

use anyhow::Context;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use countdown::{
    config::Config,
    format::{preset_seconds, ClockTime},
    render::{OutputFormat, StatusLine},
    state::{CountdownController, SessionSnapshot, TimerState},
    utils::{shutdown_signal, Command},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout stays parseable with --json
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting countdown v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: tick={}ms, grace={}ms, json={}",
        config.tick_ms, config.grace_ms, config.json
    );

    let controller = CountdownController::new(config.controller_config());
    let format = config.output_format();
    let mut snapshots = controller.subscribe();

    let initial = config.initial_duration();
    if initial > 0 {
        controller.set_duration(initial);
        controller.request_state(TimerState::Running);
    }
    let mut last_state = print_snapshot(&snapshots.borrow_and_update(), format)?;

    let mut lines = BufReader::new(stdin()).lines();
    let mut stdin_open = true;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut signals_active = true;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let previous = last_state;
                last_state = print_snapshot(&snapshot, format)?;

                let finished = !previous.is_stopped() && last_state.is_stopped();
                if finished && (!config.keep_open || !stdin_open) {
                    info!("Countdown stopped, exiting");
                    break;
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read from stdin")? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match line.parse::<Command>() {
                        Ok(Command::Quit) => {
                            info!("Quit requested");
                            break;
                        }
                        Ok(command) => handle_command(&controller, command, format)?,
                        Err(e) => warn!("Ignoring command '{}': {}", line.trim(), e),
                    },
                    None => {
                        stdin_open = false;
                        if input_closed(&controller) {
                            break;
                        }
                    }
                }
            }

            result = &mut shutdown, if signals_active => {
                match result {
                    Ok(_) => {
                        info!("Shutdown signal received");
                        controller.request_state(TimerState::Stopped);
                        break;
                    }
                    Err(e) => {
                        error!("Signal handling unavailable: {:#}", e);
                        signals_active = false;
                    }
                }
            }
        }
    }

    info!("Countdown shutdown complete");
    Ok(())
}

/// Apply one stdin command to the controller
fn handle_command(
    controller: &CountdownController,
    command: Command,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let applied = match command {
        Command::State(target) => controller.request_state(target),
        Command::Set(clock) => controller.set_duration(clock.total_seconds()),
        Command::Entry(field, text) => controller.apply_entry(field, &text),
        Command::Preset(index) => match preset_seconds(index) {
            Some(seconds) => controller.set_duration(seconds),
            None => {
                warn!("No preset number {}", index);
                return Ok(());
            }
        },
        Command::Status => {
            print_snapshot(&controller.snapshot(), format)?;
            return Ok(());
        }
        Command::Quit => return Ok(()),
    };

    if !applied {
        let snapshot = controller.snapshot();
        info!(
            "Command had no effect while {} at {}",
            snapshot.state,
            ClockTime::from_seconds(snapshot.remaining_seconds)
        );
    }
    Ok(())
}

/// React to stdin closing; returns whether to exit.
///
/// Only a running countdown can still finish on its own. A paused one could
/// never be resumed, so it is stopped.
fn input_closed(controller: &CountdownController) -> bool {
    match controller.state() {
        TimerState::Running => false,
        TimerState::Paused => {
            info!("Input closed while paused, stopping");
            controller.request_state(TimerState::Stopped);
            true
        }
        TimerState::Stopped => {
            info!("Input closed with no countdown in progress, exiting");
            true
        }
    }
}

/// Print a snapshot to stdout and return its state
fn print_snapshot(snapshot: &SessionSnapshot, format: OutputFormat) -> anyhow::Result<TimerState> {
    let line = StatusLine::new(snapshot)
        .render(format)
        .map_err(anyhow::Error::msg)?;
    println!("{}", line);
    Ok(snapshot.state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn closed_input_stops_a_paused_countdown() {
        let controller = CountdownController::default();
        controller.set_duration(10);
        controller.request_state(TimerState::Running);
        controller.request_state(TimerState::Paused);

        assert!(input_closed(&controller));
        assert_eq!(controller.state(), TimerState::Stopped);
        assert_eq!(controller.remaining_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_lets_a_running_countdown_finish() {
        let controller = CountdownController::default();
        controller.set_duration(10);
        controller.request_state(TimerState::Running);

        assert!(!input_closed(&controller));
        assert_eq!(controller.state(), TimerState::Running);
        assert!(input_closed(&CountdownController::default()));
        controller.request_state(TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn preset_zero_is_ignored() {
        let controller = CountdownController::default();
        handle_command(&controller, Command::Preset(0), OutputFormat::Text).unwrap();
        assert_eq!(controller.total_seconds(), 0);
        handle_command(&controller, Command::Preset(2), OutputFormat::Text).unwrap();
        assert_eq!(controller.total_seconds(), 60);
    }
}
