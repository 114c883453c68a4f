use std::time::Duration;

use breathwork_core::{
    Config, Event, Preset, RunnerOptions, SessionController, SessionRunner, SessionState,
};
use clap::Subcommand;
use tokio::sync::broadcast::error::RecvError;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session in the terminal (Ctrl-C stops it)
    Run {
        /// Preset name; defaults to `default_preset` from the config
        preset: Option<String>,
        /// Print every event as a JSON line
        #[arg(long)]
        json: bool,
        /// Override the tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Print the phase timeline of a whole session without waiting
    Plan {
        /// Preset name; defaults to `default_preset` from the config
        preset: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn resolve_preset(
    name: Option<String>,
    config: &Config,
) -> Result<Preset, Box<dyn std::error::Error>> {
    match name {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.default_preset),
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        SessionAction::Run {
            preset,
            json,
            interval_ms,
        } => {
            let preset = resolve_preset(preset, &config)?;
            let mut options = config.runner_options();
            if let Some(ms) = interval_ms {
                if ms == 0 {
                    return Err("--interval-ms must be greater than zero".into());
                }
                options.tick_interval = Duration::from_millis(ms);
            }
            let json = json || config.json_output;

            if !json && config.show_description {
                println!("{}", preset.title());
                println!("{}", preset.description());
            }

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()?;
            runtime.block_on(run_session(preset, options, json))
        }
        SessionAction::Plan { preset, json } => {
            let preset = resolve_preset(preset, &config)?;
            let events = SessionController::simulate(preset);
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                print_plan(&events);
            }
            Ok(())
        }
    }
}

async fn run_session(
    preset: Preset,
    options: RunnerOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runner = SessionRunner::new(options);
    let mut events = runner.subscribe();
    runner.start_preset(preset);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    render(&event, json)?;
                    if event.is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer fell behind the session");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                tracing::info!("interrupted, stopping session");
                runner.stop();
            }
        }
    }

    runner.stop();
    Ok(())
}

fn render(event: &Event, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::StateSnapshot(state) if state.is_running() => println!("{}", status_line(state)),
        Event::SessionCompleted { .. } => println!("Congrats!"),
        Event::SessionStopped {
            completed_cycles, ..
        } => println!(
            "Stopped after {completed_cycles}/{} cycles.",
            breathwork_core::SESSION_CYCLES
        ),
        _ => {}
    }
    Ok(())
}

fn status_line(state: &SessionState) -> String {
    format!(
        "{:<7} {:>3}s  cycle {}/{}",
        state.phase_label,
        state.remaining_secs,
        (state.completed_cycles + 1).min(state.total_cycles),
        state.total_cycles
    )
}

fn print_plan(events: &[Event]) {
    let mut elapsed: u32 = 0;
    for event in events {
        match event {
            Event::SessionStarted {
                preset, durations, ..
            } => {
                println!(
                    "{:>5}  start {} ({} cycles)",
                    "0s",
                    preset.title(),
                    breathwork_core::SESSION_CYCLES
                );
                println!("{:>5}  Inhale {}s", "0s", durations.inhale_secs);
            }
            Event::StateSnapshot(_) => elapsed += 1,
            Event::PhaseAdvanced {
                to,
                duration_secs,
                cycle_completed,
                ..
            } => {
                // The tick's snapshot follows its boundaries.
                let at = elapsed + 1;
                let marker = if *cycle_completed { "  (cycle done)" } else { "" };
                println!(
                    "{:>5}  {} {}s{}",
                    format!("{at}s"),
                    to,
                    duration_secs,
                    marker
                );
            }
            Event::SessionCompleted { .. } => {
                println!("{:>5}  complete", format!("{elapsed}s"));
            }
            _ => {}
        }
    }
}
