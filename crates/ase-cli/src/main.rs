//! # ase CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ase_cli::enforce::{run_enforce, EnforceArgs};
use ase_cli::run::{run_run, RunArgs};

/// ASE: admissible step enforcement.
///
/// Gates proposed state changes so that every applied change keeps the
/// state inside its admissible domain, falling back to the neutral change.
#[derive(Parser, Debug)]
#[command(name = "ase", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Gate one proposed change on the bounded scalar domain.
    Enforce(EnforceArgs),

    /// Run a seeded host loop over a domain, optionally comparing modes.
    Run(RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Enforce(args) => run_enforce(&args),
        Commands::Run(args) => run_run(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ase_cli::scenario::DomainKind;
    use ase_core::Mode;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_enforce() {
        let cli =
            Cli::try_parse_from(["ase", "enforce", "--state", "0.9", "--step", "0.5"]).unwrap();
        if let Commands::Enforce(args) = cli.command {
            assert_eq!(args.state, 0.9);
            assert_eq!(args.step, 0.5);
            assert_eq!(args.mode, Mode::Reject);
            assert_eq!(args.limit, 1.0);
            assert_eq!(args.max_attempts, 16);
            assert_eq!(args.factor, 0.5);
            assert!(!args.json);
        } else {
            panic!("expected enforce");
        }
    }

    #[test]
    fn cli_parse_enforce_negative_and_nan() {
        let cli = Cli::try_parse_from([
            "ase", "enforce", "--state", "-0.9", "--step", "nan", "--mode", "SCALE",
        ])
        .unwrap();
        if let Commands::Enforce(args) = cli.command {
            assert_eq!(args.state, -0.9);
            assert!(args.step.is_nan());
            assert_eq!(args.mode, Mode::Scale);
        } else {
            panic!("expected enforce");
        }
    }

    #[test]
    fn cli_parse_enforce_requires_step() {
        assert!(Cli::try_parse_from(["ase", "enforce", "--state", "0.0"]).is_err());
    }

    #[test]
    fn cli_parse_enforce_rejects_unknown_mode() {
        let result = Cli::try_parse_from([
            "ase", "enforce", "--state", "0", "--step", "0", "--mode", "clip",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_run_defaults() {
        let cli = Cli::try_parse_from(["ase", "run"]).unwrap();
        if let Commands::Run(args) = cli.command {
            assert!(args.scenario.is_none());
            assert!(args.domain.is_none());
            assert!(args.mode.is_none());
            assert!(!args.compare);
            assert!(!args.json);
        } else {
            panic!("expected run");
        }
    }

    #[test]
    fn cli_parse_run_with_all_options() {
        let cli = Cli::try_parse_from([
            "ase",
            "run",
            "--scenario",
            "scenarios/ball.yaml",
            "--domain",
            "learning",
            "--mode",
            "project",
            "--steps",
            "500",
            "--seed",
            "7",
            "--eta",
            "0.05",
            "--compare",
            "--json",
        ])
        .unwrap();
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.scenario, Some(PathBuf::from("scenarios/ball.yaml")));
            assert_eq!(args.domain, Some(DomainKind::Learning));
            assert_eq!(args.mode, Some(Mode::Project));
            assert_eq!(args.steps, Some(500));
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.eta, Some(0.05));
            assert!(args.compare);
            assert!(args.json);
        } else {
            panic!("expected run");
        }
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["ase", "run"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 = Cli::try_parse_from(["ase", "-vv", "run"]).unwrap();
        assert_eq!(cli2.verbose, 2);

        let cli3 = Cli::try_parse_from(["ase", "run", "-vvv"]).unwrap();
        assert_eq!(cli3.verbose, 3);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["ase"]).is_err());
    }
}
