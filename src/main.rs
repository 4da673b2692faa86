use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use revision_checker::config::{ScheduleSettings, Settings, StoreSettings};
use revision_checker::Result;
use std::io;

#[derive(Parser)]
#[command(name = "revision-checker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detects production/staging release changes and posts webhook notifications", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one check now
    Check {
        #[command(flatten)]
        settings: Settings,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Check on a fixed interval until interrupted
    Watch {
        #[command(flatten)]
        settings: Settings,

        #[command(flatten)]
        schedule: ScheduleSettings,
    },

    /// Show the persisted version state
    State {
        #[command(flatten)]
        store: StoreSettings,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    revision_checker::logging::init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check { settings, json } => {
            revision_checker::cli::check::run(&settings, json).await?;
        }

        Commands::Watch { settings, schedule } => {
            revision_checker::cli::watch::run(&settings, &schedule).await?;
        }

        Commands::State { store, json } => {
            revision_checker::cli::state::run(&store, json).await?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "revision-checker", &mut io::stdout());
        }
    }

    Ok(())
}
