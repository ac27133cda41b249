//! CLI command definitions and handlers.

pub mod models;
pub mod predict;

use clap::{Parser, Subcommand};

/// blinkcheck - face and blink detection demo
#[derive(Parser)]
#[command(name = "blinkcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared predict arguments (image, thresholds, output).
    #[command(flatten)]
    pub predict: predict::PredictArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the detection pipeline on an image
    Predict(predict::PredictArgs),
    /// Manage ML model weights
    Models(models::ModelsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run completed.
    Success,
    /// The run aborted with an error.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::from(0),
            ExitCode::Error => Self::from(1),
        }
    }
}
