use std::time::Duration;

use clap::Subcommand;
use serde::Serialize;
use weekfocus_core::{App, Event, FocusPhase, FocusStats, TokioTicker};

use super::{open_app, open_app_with, print_json, CmdResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Print the timer state as JSON
    Status,
    /// Run the timer in the foreground until the phase ends or Ctrl-C
    Run {
        /// Stop (paused) after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
        /// Tick period in milliseconds
        #[arg(long, default_value_t = 1000, hide = true)]
        tick_ms: u64,
    },
    /// Pause the timer
    Pause,
    /// Return to a full work phase
    Reset,
    /// Complete the current phase now
    Skip,
    /// Count a task finished during focus
    CompleteTask,
}

#[derive(Serialize)]
struct FocusStatus<'a> {
    phase: FocusPhase,
    is_active: bool,
    remaining_secs: u64,
    time_display: String,
    progress: f64,
    auto_continue: bool,
    stats: &'a FocusStats,
}

#[derive(Serialize)]
struct FocusOutput<'a> {
    events: Vec<Event>,
    status: FocusStatus<'a>,
}

fn status(app: &App) -> FocusStatus<'_> {
    let timer = app.timer();
    FocusStatus {
        phase: timer.current_phase(),
        is_active: timer.is_active(),
        remaining_secs: timer.remaining_secs(),
        time_display: timer.time_display(),
        progress: timer.progress(),
        auto_continue: timer.auto_continue(),
        stats: timer.stats(),
    }
}

fn print_output(app: &App, events: Vec<Event>) -> CmdResult {
    print_json(&FocusOutput {
        events,
        status: status(app),
    })
}

pub fn run(action: FocusAction) -> CmdResult {
    if let FocusAction::Run { ticks, tick_ms } = action {
        return run_foreground(ticks, Duration::from_millis(tick_ms.max(1)));
    }

    let mut app = open_app()?;
    let events = match action {
        FocusAction::Status => Vec::new(),
        FocusAction::Pause => app.pause_focus(),
        FocusAction::Reset => app.reset_focus(),
        FocusAction::Skip => app.skip_focus(),
        FocusAction::CompleteTask => app.complete_focus_task(),
        FocusAction::Run { .. } => Vec::new(),
    };
    print_output(&app, events)
}

/// Drive the timer from a tokio interval on a current-thread runtime.
fn run_foreground(max_ticks: Option<u64>, period: Duration) -> CmdResult {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let (ticker, mut rx) = TokioTicker::with_period(period);
        let mut app = open_app_with(Box::new(ticker))?;
        let mut events = app.start_focus();
        let mut delivered = 0u64;
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        while app.timer().is_active() {
            if max_ticks.is_some_and(|max| delivered >= max) {
                events.extend(app.pause_focus());
                break;
            }
            tokio::select! {
                received = rx.recv() => {
                    let Some(handle) = received else { break };
                    delivered += 1;
                    events.extend(app.on_tick(handle));
                }
                _ = &mut interrupt => {
                    tracing::info!("interrupted, pausing");
                    events.extend(app.pause_focus());
                    break;
                }
            }
        }

        print_output(&app, events)
    })
}
