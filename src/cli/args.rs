//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `init`: Write a default configuration file
//! - `collect`: Collect message keys, write the template and merge locales
//! - `wrap`: Wrap translatable literals in translator calls
//! - `annotate`: Add context comments to catalogs
//! - `transfer`: Re-key a catalog by the translations of another
//! - `restore`: Map translations of a re-keyed catalog back
//! - `stats`: Print catalog statistics

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Collect(cmd)) => cmd.common.verbose,
            Some(Command::Wrap(cmd)) => cmd.common.verbose,
            Some(Command::Annotate(cmd)) => cmd.common.verbose,
            Some(Command::Transfer(cmd)) | Some(Command::Restore(cmd)) => cmd.common.verbose,
            Some(Command::Stats(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root; the config file is searched from here (default: current directory)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Catalog directory (overrides config file)
    #[arg(long)]
    pub catalog_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct CollectCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Locales to merge (overrides config file)
    #[arg(long, value_delimiter = ',')]
    pub locales: Vec<String>,

    /// Only write the template, do not merge locale catalogs
    #[arg(long)]
    pub no_merge: bool,
}

#[derive(Debug, Args)]
pub struct WrapCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// File with one control message per line; only these phrases are wrapped
    #[arg(long)]
    pub control_messages: Option<PathBuf>,

    /// Wrap every candidate without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Report what would be wrapped without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Write per-message counts of the control-message run as JSON
    #[arg(long, requires = "control_messages")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AnnotateCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Catalogs to annotate in place
    #[arg(required = true)]
    pub catalogs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TransferCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Catalog the translations are taken from
    pub source: PathBuf,

    /// Catalog that is updated
    pub dest: PathBuf,

    /// Write the result here instead of overwriting the destination
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StatsCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(required = true)]
    pub catalogs: Vec<PathBuf>,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a new .harvestrc.json configuration file
    Init,
    /// Collect message keys, write messages.pot and merge it into locale catalogs
    Collect(CollectCommand),
    /// Wrap translatable string literals in translator calls
    Wrap(WrapCommand),
    /// Add a CONTEXT: comment to catalog items that have a context
    Annotate(AnnotateCommand),
    /// Re-key a catalog by the translations of a source catalog
    Transfer(TransferCommand),
    /// Copy translations of a transferred catalog back onto the original
    Restore(TransferCommand),
    /// Print message, character and word counts of catalogs
    Stats(StatsCommand),
}
