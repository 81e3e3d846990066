//! Foreground supervision loop and status output.

use crate::commands::ConsoleCommand;
use crate::error::Result as LauncherResult;

use rv_config::Config;
use rv_supervisor::{AppContext, LifecycleState, Notice, ServerStatus, SupervisorError};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

/// Backend output lines replayed when a run fails.
const FAILURE_TAIL_LINES: usize = 20;

/// Bring the backend up and keep it supervised until a shutdown signal, a
/// `quit` console command, or stdin closing after a failure.
pub async fn supervise(config: &Config, restart: bool) -> LauncherResult<()> {
    let ctx = Arc::new(AppContext::from_config(config)?);

    spawn_event_reporters(&ctx);
    let mut shutdown_rx = install_signal_handler();

    let outcome = if restart {
        ctx.restart().await
    } else {
        ctx.start().await
    };

    match &outcome {
        Ok(()) => info!("Backend ready. Commands: restart (r), status (s), quit (q)"),
        Err(e) => warn!("Start sequence ended: {}", e.summary()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match ConsoleCommand::parse(&line) {
                    Some(ConsoleCommand::Restart) => {
                        if let Err(e) = ctx.restart().await {
                            warn!("Restart ended: {}", e.summary());
                        }
                    }
                    Some(ConsoleCommand::Status) => print_status_line(&ctx.status().await),
                    Some(ConsoleCommand::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => warn!("Unknown command '{}'", line.trim()),
                },
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    if outcome.is_err() {
                        break;
                    }
                }
            },
            Some(signal) = shutdown_rx.recv() => {
                info!("Received signal {signal}, shutting down...");
                break;
            }
            else => break,
        }
    }

    ctx.shutdown().await;
    info!("Launcher stopped");

    outcome.or_else(|e| match e {
        SupervisorError::Cancelled { .. } => Ok(()),
        other => Err(other.into()),
    })
}

/// Probe the configured endpoint once and print the result.
pub async fn print_status(config: &Config, json: bool) -> LauncherResult<()> {
    let ctx = AppContext::from_config(config)?;
    let status = ctx.probe_status().await;

    if json {
        match serde_json::to_string_pretty(&status) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Failed to serialize status: {e}"),
        }
    } else {
        print_status_line(&status);
    }

    Ok(())
}

fn print_status_line(status: &ServerStatus) {
    println!("{}", status.headline());
    if let Some(error) = &status.error {
        println!("  error: {error}");
    }
    if let Some(hint) = &status.recovery_hint {
        println!("  hint: {hint}");
    }
}

/// Forward controller events to the terminal and log.
fn spawn_event_reporters(ctx: &Arc<AppContext>) {
    let mut progress = ctx.controller().subscribe_progress();
    tokio::spawn(async move {
        while let Some(event) = next_event(&mut progress).await {
            println!("[{:>3}%] {}", event.percent, event.message);
        }
    });

    let mut notices = ctx.controller().subscribe_notices();
    tokio::spawn(async move {
        while let Some(notice) = next_event(&mut notices).await {
            match notice {
                Notice::Info { message } => println!("{message}"),
                Notice::Error { message, hint } => {
                    eprintln!("Error: {message}");
                    eprintln!("  {hint}");
                }
            }
        }
    });

    let tail = Arc::new(Mutex::new(VecDeque::with_capacity(FAILURE_TAIL_LINES)));

    let mut logs = ctx.subscribe_logs();
    let log_tail = Arc::clone(&tail);
    tokio::spawn(async move {
        while let Some(line) = next_event(&mut logs).await {
            let Ok(mut tail) = log_tail.lock() else {
                return;
            };
            if tail.len() == FAILURE_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(format!("{} | {}", line.stream, line.line));
        }
    });

    let mut states = ctx.controller().subscribe_state();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if let LifecycleState::Failed { error } = state {
                error!("Backend failed: {error}. Type 'restart' to try again.");
                print_output_tail(&tail);
            }
        }
    });

    // The readiness subscription lives as long as the launcher.
    let _ = ctx.readiness().subscribe(|ready| {
        if ready {
            info!("Backend features available");
        } else {
            info!("Backend features unavailable");
        }
    });
}

fn print_output_tail(tail: &Mutex<VecDeque<String>>) {
    let Ok(tail) = tail.lock() else {
        return;
    };
    if tail.is_empty() {
        return;
    }
    eprintln!("Last backend output:");
    for line in tail.iter() {
        eprintln!("  {line}");
    }
}

async fn next_event<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Option<T> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Dropped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Deliver SIGINT/SIGTERM to the supervision loop.
#[cfg(unix)]
fn install_signal_handler() -> mpsc::Receiver<i32> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let (tx, rx) = mpsc::channel(1);

    std::thread::spawn(move || {
        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to register signal handlers: {e}");
                return;
            }
        };

        if let Some(sig) = signals.forever().next() {
            let _ = tx.blocking_send(sig);
        }
    });

    rx
}

#[cfg(not(unix))]
fn install_signal_handler() -> mpsc::Receiver<i32> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(2).await;
        }
    });

    rx
}
