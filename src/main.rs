use std::path::PathBuf;
use std::process::ExitCode;

use popmenu::config::Config;
use popmenu::scenario::{self, Scenario};

fn main() -> ExitCode {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .compact()
            .init();
    }

    let arg = ::std::env::args().nth(1);
    match arg.as_ref().map(|s| &s[..]) {
        Some("--help") | Some("-h") | None => {
            println!("USAGE: popmenu <scenario.toml>");
            println!();
            println!("Replays the scripted events of a scenario against its menus");
            println!("and prints what the page looks like after every step.");
            if arg.is_none() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Some(path) => match run(PathBuf::from(path)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(path: PathBuf) -> anyhow::Result<()> {
    let scenario = Scenario::load(&path)?;
    tracing::info!(
        "Running {} with {} menus and {} steps",
        path.display(),
        scenario.menus.len(),
        scenario.steps.len()
    );
    let transcript = Config::with(|config| scenario::run(config, &scenario))?;
    print!("{transcript}");
    Ok(())
}
