mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use brahe_core::config::load_configuration;
use brahe_core::{Engine, Progress, RunConfig, RunSummary};
use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use progress::{CliReporter, StatusDisplay};
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let settings = load_configuration()?;
    let config = RunConfig::new(args.paths.clone(), args.mode(), args.options(), &settings)?;

    for (i, entry) in config.entries.iter().enumerate() {
        if i == 0 {
            println!("   Source: {}", entry.display());
        } else {
            println!("Target #{}: {}", i, entry.display());
        }
    }

    if !args.yes && !prompt_confirm("Start comparing?", Some(false))? {
        info!("Cancelled at the prompt");
        return Ok(());
    }

    let progress = Arc::new(Progress::new());
    let display = StatusDisplay::start(
        Arc::clone(&progress),
        Duration::from_millis(settings.refresh_interval_ms),
    );
    let reporter = Arc::new(CliReporter::new(display.bar()));
    let engine = Engine::new(config, progress, reporter);

    let result = engine.run();
    display.finish();

    print_summary(&result?);
    Ok(())
}

/// The whole cause chain on one line.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}

fn print_summary(summary: &RunSummary) {
    let counts = &summary.counts;
    println!();
    println!(
        "Finished in {}",
        format!("{:.2}s", summary.duration.as_secs_f64()).green()
    );
    println!(
        "{} matched, {} mismatched, {} missing, {} ignored, {} copied",
        counts.matched.to_string().green(),
        counts.mismatched.to_string().red(),
        counts.missing.to_string().yellow(),
        counts.ignored.to_string().dimmed(),
        counts.copied.to_string().cyan(),
    );
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        // EOF counts as an empty answer
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brahe_core::Error;
    use std::path::Path;

    #[test]
    fn test_diagnostic_names_cause_once() {
        let err = anyhow::Error::from(Error::io(
            "list directory",
            Path::new("/nope"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        ));
        let line = diagnostic(&err);
        assert_eq!(line, "Failed to list directory /nope: gone");
        assert!(!line.contains('\n'));
    }
}
