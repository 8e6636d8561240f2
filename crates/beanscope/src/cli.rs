//! Clap derive structures for the `beanscope` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// beanscope -- introspect and invoke managed objects
#[derive(Debug, Parser)]
#[command(
    name = "beanscope",
    version,
    about = "Inspect attributes and call operations on managed objects",
    long_about = "A console for introspecting managed objects: list their \
        attributes and operations,\nread and write attribute values, and \
        invoke operations with text-coerced arguments.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, env = "BEANSCOPE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Named target from the config file
    #[arg(long, short = 't', env = "BEANSCOPE_TARGET", global = true)]
    pub target: Option<String>,

    /// Output format (defaults to the configured value)
    #[arg(long, short = 'o', env = "BEANSCOPE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Truncate scalar values to this many characters (0 = unbounded)
    #[arg(long, env = "BEANSCOPE_MAX_LENGTH", global = true)]
    pub max_length: Option<usize>,

    /// Disable attribute writes for this invocation
    #[arg(long, global = true)]
    pub deny_write: bool,

    /// Disable operation calls for this invocation
    #[arg(long, global = true)]
    pub deny_call: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text, tables for tabular values (default)
    Tree,
    /// JSON response envelope
    Json,
    /// HTML fragment, as embedded by the management pages
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered managed objects
    #[command(alias = "ls")]
    Objects,

    /// List an object's attributes with their current values
    #[command(alias = "at")]
    Attrs(ObjectArgs),

    /// List an object's callable operations
    #[command(alias = "op")]
    Ops(ObjectArgs),

    /// Read one attribute
    Get(GetArgs),

    /// Write one attribute from text
    Set(SetArgs),

    /// Invoke an operation by signature
    Call(CallArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ObjectArgs {
    /// Managed object name (e.g., "sample.CounterService")
    pub object: String,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Managed object name
    pub object: String,

    /// Attribute name (e.g., "Count")
    pub attribute: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Managed object name
    pub object: String,

    /// Attribute name
    pub attribute: String,

    /// New value as text; the literal "null" writes the absent value
    pub value: String,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Managed object name
    pub object: String,

    /// Canonical signature (e.g., "submit(string,int)")
    pub signature: String,

    /// Operation arguments as text, one per declared parameter
    pub args: Vec<String>,

    /// Per-argument decode type overrides, comma-separated canonical
    /// tokens aligned with the arguments; "_" skips a position
    #[arg(long, value_name = "TYPES")]
    pub arg_types: Option<String>,
}

// ── Config Subcommand ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file with the default settings
    Init,
}

// ── Completions Subcommand ───────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
