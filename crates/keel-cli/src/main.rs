//! Keel CLI - backbone analyzer for CNF formulas.

mod signals;

use clap::{ArgAction, Parser};
use keel_base::{Error, Verbosity};
use keel_engine::{Engine, EngineConfig};
use keel_format::{open_input, DimacsCnf};
use keel_oracle::{CdclOracle, Oracle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about = "CNF backbone analyzer", long_about = None)]
struct Cli {
    /// Input DIMACS file (standard input when omitted); .gz is decoded
    input: Option<PathBuf>,

    /// Disable all messages
    #[arg(short, long, conflicts_with_all = ["verbose", "logging"])]
    quiet: bool,

    /// Increase verbosity (oracle verbosity is increased with two -v)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Extensive logging for debugging
    #[arg(short = 'l', long)]
    logging: bool,

    /// Report what the oracle is doing
    #[arg(short, long)]
    report: bool,

    /// Do not print the backbone
    #[arg(short = 'n', long = "no-backbones")]
    no_backbones: bool,

    /// Print statistics even when quiet
    #[arg(short = 's', long)]
    statistics: bool,

    /// Verify every classification with a second oracle
    #[arg(long)]
    check: bool,

    /// Disable model-based filtering
    #[arg(long)]
    no_filter: bool,

    /// Disable root-level fixed-literal queries
    #[arg(long)]
    no_fixed: bool,

    /// Disable model flipping
    #[arg(long)]
    no_flip: bool,

    /// Disable oracle inprocessing
    #[arg(long)]
    no_inprocessing: bool,

    /// Disable the disjunctive constrain shortcut
    #[arg(long)]
    no_constrain: bool,

    /// Disable decision-phase biasing
    #[arg(long)]
    no_phase: bool,

    /// Disable every optimization
    #[arg(long)]
    plain: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.logging {
            Verbosity::Logging
        } else if self.verbose > 0 {
            Verbosity::Verbose(self.verbose)
        } else {
            Verbosity::Default
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let mut config = if self.plain {
            EngineConfig::plain()
        } else {
            EngineConfig::default()
        };
        config.verbosity = self.verbosity();
        config.print_backbones = !self.no_backbones;
        config.report = self.report;
        config.always_print_statistics = self.statistics;
        config.check = self.check;
        if self.no_filter {
            config.filter = false;
        }
        if self.no_fixed {
            config.use_fixed = false;
        }
        if self.no_flip {
            config.use_flip = false;
        }
        if self.no_inprocessing {
            config.use_inprocessing = false;
        }
        if self.no_constrain {
            config.use_constrain = false;
        }
        if self.no_phase {
            config.set_phase = false;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0u8,
                _ => 1u8,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("keel: error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let verbosity = cli.verbosity();
    setup_logging(verbosity);

    let comment = |text: &str| {
        if verbosity.allows_messages() {
            println!("c {text}");
        }
    };
    comment(&format!(
        "Keel BackBone Analyzer version {}",
        env!("CARGO_PKG_VERSION")
    ));

    match &cli.input {
        Some(path) => comment(&format!("reading from '{}'", path.display())),
        None => comment("reading from '<stdin>'"),
    }
    let reader = open_input(cli.input.as_deref())?;
    let cnf = DimacsCnf::from_reader(reader)?;

    let mut oracle = CdclOracle::new();
    let n = oracle.load_dimacs(&cnf);
    comment(&format!("found {n} variables"));

    let config = cli.engine_config();
    let print_statistics = verbosity.allows_messages() || config.always_print_statistics;
    let verbose_statistics = matches!(verbosity, Verbosity::Verbose(_) | Verbosity::Logging);

    let mut engine = Engine::new(oracle, n, config, io::stdout())?;
    let stats = engine.stats();
    let _signals = signals::install(stats.clone(), print_statistics)?;

    let verdict = match engine.run() {
        Ok(verdict) => verdict,
        Err(err) if err.is_fatal() => {
            // Dump what we know, then abort for a core dump.
            eprintln!("keel: fatal: {err}");
            let _ = stats.snapshot().print(&mut io::stdout(), true);
            std::process::abort();
        }
        Err(err) => return Err(err.into()),
    };
    drop(engine);

    if print_statistics {
        stats
            .snapshot()
            .print(&mut io::stdout(), verbose_statistics)
            .map_err(Error::Io)?;
    }
    comment(&format!("exit {}", verdict.code()));

    Ok(ExitCode::from(verdict.code() as u8))
}

fn setup_logging(verbosity: Verbosity) {
    let filter = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Default => "warn",
        Verbosity::Verbose(1) => "info",
        Verbosity::Verbose(_) => "debug",
        Verbosity::Logging => "trace",
    };
    // Diagnostics go to stderr; stdout carries only protocol lines.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_flag_disables_optimizations() {
        let cli = Cli::parse_from(["keel", "--plain", "input.cnf"]);
        let config = cli.engine_config();
        assert!(!config.filter);
        assert!(!config.use_constrain);
        assert!(!config.use_flip);
        assert!(config.print_backbones);
    }

    #[test]
    fn test_verbosity_ladder() {
        let quiet = Cli::parse_from(["keel", "-q"]);
        assert_eq!(quiet.verbosity(), Verbosity::Quiet);
        let verbose = Cli::parse_from(["keel", "-vv"]);
        assert_eq!(verbose.verbosity(), Verbosity::Verbose(2));
        let logging = Cli::parse_from(["keel", "-l"]);
        assert_eq!(logging.verbosity(), Verbosity::Logging);
    }

    #[test]
    fn test_switches_map_to_config() {
        let cli = Cli::parse_from(["keel", "-n", "--check", "--no-fixed"]);
        let config = cli.engine_config();
        assert!(!config.print_backbones);
        assert!(config.check);
        assert!(!config.use_fixed);
        assert!(config.filter);
    }
}
