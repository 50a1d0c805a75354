//! CLI argument parsing, logging setup and exit codes

use std::io::Write;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use log::{debug, LevelFilter};

use cpzip::archive::Backend;
use cpzip::batch::{expand_pattern, run_pairs};
use cpzip::config::InsertOptions;
use cpzip::mutator::NestedMutator;
use cpzip::output::OutputConfig;

/// Exit code used when the command line cannot be parsed.
pub const USAGE_EXIT_CODE: i32 = -1;

const EXAMPLE: &str = "\
Example:
  cpzip my_photo.png my_photos.zip christmas/this_year.zip/new
will copy 'my_photo.png' to the folder 'new' of the nested file 'this_year.zip' updating 'my_photos.zip' accordingly";

/// Copies file to the target zip archive, with nested archives support.
#[derive(Parser, Debug)]
#[command(name = "cpzip")]
#[command(version, long_about = None)]
#[command(override_usage = "cpzip <SOURCE_FILE> <TARGET_FILE> <TARGET_PATH> [OPTIONS]")]
#[command(after_help = EXAMPLE)]
pub struct Cli {
    /// Source file(s) to copy. Can be a wildcard.
    #[arg(value_name = "SOURCE_FILE")]
    source_file: String,

    /// Target file(s) to copy to. Can be a wildcard.
    #[arg(value_name = "TARGET_FILE")]
    target_file: String,

    /// Path within the target file. Use '/' as a separator or as a root path.
    #[arg(value_name = "TARGET_PATH")]
    target_path: String,

    /// Do not overwrite existing files.
    #[arg(short = 'n', long)]
    no_overwrite: bool,

    /// Set output to verbose messages.
    #[arg(short, long)]
    verbose: bool,

    /// Archive back-end used to read and rewrite archives
    #[arg(long, value_enum, env = "CPZIP_BACKEND", default_value_t = BackendArg::Rewrite)]
    backend: BackendArg,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BackendArg {
    /// Stream a new archive on commit, copying untouched entries raw
    Rewrite,
    /// Load entries into memory and re-encode the archive on commit
    Memory,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Rewrite => Backend::Rewrite,
            BackendArg::Memory => Backend::Memory,
        }
    }
}

impl Cli {
    /// Parse the process arguments.
    ///
    /// `--help` and `--version` exit with 0. Any other parse failure prints
    /// the error followed by the help text and exits with [`USAGE_EXIT_CODE`].
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => {
                let _ = e.print();
                let _ = Self::command().print_help();
                println!();
                std::process::exit(USAGE_EXIT_CODE)
            }
        }
    }

    /// Run the copy and return the process exit code.
    pub fn execute(self) -> i32 {
        init_logging(self.verbose);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.run(&output) {
            Ok(code) => code,
            Err(e) => {
                output.report_error(format!("{:#}", e));
                exit_code(&e)
            }
        }
    }

    fn run(&self, output: &OutputConfig) -> Result<i32> {
        let sources = expand_pattern(&self.source_file)
            .with_context(|| format!("Cannot expand source '{}'", self.source_file))?;
        let targets = expand_pattern(&self.target_file)
            .with_context(|| format!("Cannot expand target '{}'", self.target_file))?;

        let options = InsertOptions::new()
            .no_overwrite(self.no_overwrite)
            .verbose(self.verbose);
        let codec = Backend::from(self.backend).codec();
        let mutator = NestedMutator::new(codec.as_ref(), options);

        let outcomes = run_pairs(&mutator, &sources, &targets, &self.target_path, |outcome| {
            if let Err(e) = &outcome.result {
                output.report_error(e);
            }
        });

        let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
        if failed > 0 {
            debug!("{} of {} copies failed", failed, outcomes.len());
        }

        Ok(outcomes
            .iter()
            .find_map(|outcome| outcome.result.as_ref().err())
            .map_or(0, cpzip::Error::exit_code))
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<cpzip::Error>())
        .map(cpzip::Error::exit_code)
        .unwrap_or(1)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}
