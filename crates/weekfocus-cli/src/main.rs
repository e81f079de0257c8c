use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use weekfocus_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "weekfocus", version, about = "Weekly priorities, focus timer and streaks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Weekly priorities
    Priority {
        #[command(subcommand)]
        action: commands::priority::PriorityAction,
    },
    /// Tasks within a priority
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Focus timer control
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Daily check-in journal
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Weekly stats and wrap-up
    Week {
        #[command(subcommand)]
        action: commands::week::WeekAction,
    },
    /// Experience, level and badges
    Level {
        #[command(subcommand)]
        action: commands::level::LevelAction,
    },
    /// Schedule the daily check-in and weekly wrap-up reminders
    Reminders,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

/// Logs go to stderr; stdout carries JSON only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("WEEKFOCUS_LOG")
        .or_else(|_| EnvFilter::try_new(Config::load_or_default().logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Priority { action } => commands::priority::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Week { action } => commands::week::run(action),
        Commands::Level { action } => commands::level::run(action),
        Commands::Reminders => commands::reminders::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "weekfocus", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
