mod platform;
mod todo;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tidal_logging::tidal_info;

use platform::program::{self, Program};

/// Fetches a todo item and renders it while a clock ticks.
#[derive(Debug, Parser)]
#[command(name = "tidal-todo", version)]
struct Args {
    /// RON configuration file.
    #[arg(short, long, default_value = "tidal.ron")]
    config: PathBuf,

    /// Overrides the todo url from the configuration.
    #[arg(long)]
    url: Option<String>,

    /// Overrides the request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Write the effective configuration back to the config file.
    #[arg(long)]
    save_config: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = platform::config::load(&args.config);
    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = Some(timeout_ms);
    }
    platform::logging::initialize(&config.log, args.verbose);

    if args.save_config {
        platform::config::save(&args.config, &config)?;
        tidal_info!("Saved config to {:?}", args.config);
    }

    let settings = config.settings();
    // Long enough for every retry to time out, plus one tick.
    let per_attempt = settings.timeout.unwrap_or(Duration::from_secs(30));
    let deadline = per_attempt * (settings.retries + 1) + settings.tick_interval;

    let app = Program {
        init: todo::init(settings),
        update: todo::update,
        subscriptions: todo::subscriptions,
        view: todo::view,
        is_done: todo::Model::is_done,
    };
    let model = program::run(app, deadline, |lines| {
        for line in lines {
            println!("{line}");
        }
    })?;

    if matches!(model.load, todo::Load::Failed(_)) {
        anyhow::bail!("could not load todo from {}", model.settings.url);
    }
    Ok(())
}
