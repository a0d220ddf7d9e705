use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "recallcheck", version, about = "Check product batch codes against recall registries")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up a batch code
    Query {
        /// Batch code as printed on the product
        code: String,
        /// Do not record the lookup in history
        #[arg(long)]
        no_save: bool,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read a batch code from a product photo
    Ocr(OcrArgs),
    /// Show past lookups, newest first
    History {
        /// "all" or a status such as "recalled"
        #[arg(long, default_value = "all")]
        filter: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete every history entry
    ClearHistory,
    /// Registry statistics from the active backend
    Stats,
    /// Primary service health
    Health,
    /// Read or change a stored setting
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct OcrArgs {
    /// Image URL the OCR service can fetch
    #[arg(long)]
    pub url: Option<String>,
    /// Local image file, uploaded base64-encoded
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print a setting (null when unset)
    Get { key: String },
    /// Store a setting; values that are not valid JSON are stored as strings
    Set { key: String, value: String },
    /// Print every setting
    List,
}
