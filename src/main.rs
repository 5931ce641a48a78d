//! Strgp CLI - train and apply string-transforming program populations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use strgp::gp::ErrorBehavior;

/// Strgp - evolve programs that turn one string into another
#[derive(Parser, Debug)]
#[command(name = "strgp")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a session against a training file
    Train {
        /// Training file written by make-trainer
        #[arg(short, long)]
        trainer: PathBuf,

        /// Session file to continue from and save to
        #[arg(short, long, default_value = "session.strgp")]
        session: PathBuf,

        /// Population size for a new session (default: 100)
        #[arg(long)]
        size: Option<usize>,

        /// Generations to run (default: 10)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Failed attempts before a tree is forced in (default: 50)
        #[arg(short, long)]
        max_tries: Option<usize>,

        /// JSON run configuration; command-line options take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Use the low-restart mutation preset
        #[arg(long)]
        conservative: bool,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Write a training file from INPUT=OUT1|OUT2 cases
    MakeTrainer {
        /// Training file to write
        #[arg(short, long)]
        output: PathBuf,

        /// A case: the input, '=', then acceptable outputs separated by '|'
        #[arg(long = "case", required = true)]
        cases: Vec<String>,
    },

    /// Run every tree in a session on some text
    Use {
        /// Session file
        #[arg(short, long, default_value = "session.strgp")]
        session: PathBuf,

        /// Text to process
        #[arg(short, long)]
        text: String,

        /// What to do when a tree fails
        #[arg(short, long, value_enum, default_value = "skip")]
        errors: ErrorBehavior,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Show a session's generation counter and trees
    Info {
        /// Session file
        #[arg(short, long, default_value = "session.strgp")]
        session: PathBuf,

        /// Print every tree as an expression
        #[arg(long)]
        trees: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// List the built-in operations
    Ops,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Train {
            trainer,
            session,
            size,
            generations,
            max_tries,
            config,
            seed,
            conservative,
            progress,
        } => cli::train::execute(&cli::train::TrainOptions {
            trainer,
            session,
            size,
            generations,
            max_tries,
            config,
            seed,
            conservative,
            progress,
        }),

        Commands::MakeTrainer { output, cases } => cli::trainer::execute(&output, &cases),

        Commands::Use {
            session,
            text,
            errors,
            format,
        } => cli::use_session::execute(&session, &text, errors, format),

        Commands::Info { session, trees, format } => cli::info::execute(&session, trees, format),

        Commands::Ops => cli::ops::execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
