use std::path::{Path, PathBuf};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::core::grammar::Grammar;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Source files with a known grammar, in lexical order.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

/// Find source files under `base_dir`.
///
/// `includes` are directories, files or glob patterns relative to
/// `base_dir` (empty means the whole tree). `ignore_patterns` are globs
/// matched against the full path, or literal path prefixes.
pub fn scan_files(
    base_dir: &str,
    includes: &[String],
    ignore_patterns: &[String],
    verbose: bool,
) -> ScanResult {
    let mut files: Vec<String> = Vec::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(Path::new(base_dir).join(p));
        }
    }

    let roots: Vec<PathBuf> = if includes.is_empty() {
        vec![Path::new(base_dir).to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = Path::new(base_dir).join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten()),
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid glob pattern '{}': {}",
                                "warning:".bold().yellow(),
                                inc,
                                e
                            );
                        }
                    }
                }
            } else {
                let path = Path::new(base_dir).join(inc);
                if path.exists() {
                    paths.push(path);
                } else if verbose {
                    eprintln!(
                        "{} Include path does not exist: {}",
                        "warning:".bold().yellow(),
                        path.display()
                    );
                }
            }
        }
        paths
    };

    for root in roots {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }

            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if path.is_file() && Grammar::from_path(path).is_some() {
                files.push(path_str.into_owned());
            }
        }
    }

    files.sort();
    files.dedup();

    ScanResult {
        files,
        skipped_count,
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_scan_known_grammars_in_lexical_order() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        File::create(dir_path.join("b.lua")).unwrap();
        File::create(dir_path.join("a.js")).unwrap();
        File::create(dir_path.join("c.hbs")).unwrap();
        File::create(dir_path.join("style.css")).unwrap();

        let result = scan_files(dir_path.to_str().unwrap(), &[], &[], false);

        let names: Vec<&str> = result
            .files
            .iter()
            .map(|f| f.rsplit('/').next().unwrap())
            .collect();
        assert_eq!(names, vec!["a.js", "b.lua", "c.hbs"]);
    }

    #[test]
    fn test_scan_ignores_glob_and_literal_paths() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let node_modules = dir_path.join("node_modules");
        fs::create_dir(&node_modules).unwrap();
        File::create(node_modules.join("lib.js")).unwrap();
        let vendor = dir_path.join("vendor");
        fs::create_dir(&vendor).unwrap();
        File::create(vendor.join("x.lua")).unwrap();
        File::create(dir_path.join("app.js")).unwrap();

        let result = scan_files(
            dir_path.to_str().unwrap(),
            &[],
            &["**/node_modules/**".to_owned(), "vendor".to_owned()],
            false,
        );

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("app.js"));
    }

    #[test]
    fn test_scan_with_includes() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let src = dir_path.join("src");
        fs::create_dir(&src).unwrap();
        File::create(src.join("main.lua")).unwrap();
        File::create(dir_path.join("root.js")).unwrap();

        let result = scan_files(
            dir_path.to_str().unwrap(),
            &["src".to_owned()],
            &[],
            false,
        );
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("src/main.lua"));

        let result = scan_files(
            dir_path.to_str().unwrap(),
            &["*.js".to_owned()],
            &[],
            false,
        );
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("root.js"));
    }
}
