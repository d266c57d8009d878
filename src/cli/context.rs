use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use colored::Colorize;

use super::args::CommonArgs;
use crate::config::{Config, load_config};
use crate::core::file_scanner::scan_files;
use crate::core::grammar::Grammars;

/// Configuration and source files of the project a command runs on.
///
/// Configuration priority (highest to lowest): CLI arguments, the
/// `.harvestrc.json` found from the project root, built-in defaults.
pub struct ProjectContext {
    pub config: Config,
    /// Directory the source files are scanned from; issue paths are relative to it.
    pub source_dir: String,
    pub catalog_dir: PathBuf,
    /// Source files with a known grammar, in lexical order.
    pub files: Vec<String>,
    pub grammars: Grammars,
    pub verbose: bool,
}

impl ProjectContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        root_dir
            .to_str()
            .with_context(|| anyhow!("Invalid path: {:?}", root_dir))?;

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!("Note: No .harvestrc.json found, using default configuration");
        }
        let mut config = config_result.config;

        if let Some(ref catalog_dir) = common_args.catalog_dir {
            config.catalog_dir = catalog_dir.to_string_lossy().to_string();
        }

        let source_dir = resolve_dir(&root_dir, &config.source_root);
        let catalog_dir = resolve_dir(&root_dir, &config.catalog_dir);
        let source_dir = source_dir.to_string_lossy().into_owned();

        let scan_result = scan_files(&source_dir, &config.includes, &config.ignores, verbose);
        if scan_result.skipped_count > 0 {
            eprintln!(
                "{} {} path(s) skipped due to access errors{}",
                "warning:".bold().yellow(),
                scan_result.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        let grammars = Grammars::from_config(&config)?;

        Ok(Self {
            config,
            source_dir,
            catalog_dir,
            files: scan_result.files,
            grammars,
            verbose,
        })
    }
}

/// `dir` taken relative to `root_dir` unless it is absolute.
fn resolve_dir(root_dir: &Path, dir: &str) -> PathBuf {
    let p = Path::new(dir);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    let is_cur_dir = root_dir
        .components()
        .all(|c| matches!(c, Component::CurDir));
    if is_cur_dir {
        p.to_path_buf()
    } else {
        let rel = p.strip_prefix(Path::new(".")).unwrap_or(p);
        root_dir.join(rel)
    }
}
