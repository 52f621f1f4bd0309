use std::path::PathBuf;

use clap::Parser;

/// Categorize RFP documents into sections with a table of contents.
///
/// Without `--out` an interactive session starts with FILES loaded. With
/// `--out` the files are decoded, selected, categorized and rendered to an
/// HTML page in one go.
#[derive(Parser, Debug)]
#[command(name = "rfpcat", about = "Categorize RFP documents into sections with a table of contents")]
pub struct CliArgs {
    /// Files to load as the first batch (text, PDF, Word, images)
    pub files: Vec<PathBuf>,

    /// Write the rendered page here and exit (one-shot mode)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// In one-shot mode, select only these file names, in this order (repeatable)
    #[arg(long = "select", value_name = "NAME")]
    pub select: Vec<String>,

    /// Use the contents of a text file as the pasted RFP text
    #[arg(long, value_name = "PATH")]
    pub text: Option<PathBuf>,

    /// Categorize through a running rfpcat server instead of calling the LLM directly
    #[arg(long)]
    pub server: Option<String>,

    /// LLM provider: openai, anthropic, or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name override (uses provider default if not set)
    #[arg(long)]
    pub model: Option<String>,

    /// API key (overrides env var and config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to config file (default: ~/.config/rfpcat/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Page title for the rendered output
    #[arg(long, default_value = rfpcat_outline::DEFAULT_PAGE_TITLE)]
    pub title: String,
}
