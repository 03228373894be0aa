//! Trace file discovery.
//!
//! With no arguments every `**/*.ship` file under the search directory is
//! used. Each argument naming an existing path is taken as-is; any other
//! argument is a name prefix, matched as `**/<arg>*.ship` under the search
//! directory.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Environment variable naming the directory trace files are written to.
pub const SEARCH_DIR_ENV: &str = "APP_TMP";

/// `$APP_TMP` if set, else `/tmp`.
pub fn default_search_dir() -> PathBuf {
    std::env::var_os(SEARCH_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Resolve command line arguments to trace files.
///
/// Results keep argument order; files found under the search directory for
/// one argument are sorted.
pub fn find_trace_files(search_dir: &Path, args: &[String]) -> Result<Vec<PathBuf>, ignore::Error> {
    if args.is_empty() {
        return walk_matching(search_dir, "**/*.ship");
    }

    let mut files = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if path.exists() {
            files.push(path.to_path_buf());
        } else {
            files.extend(walk_matching(search_dir, &format!("**/{arg}*.ship"))?);
        }
    }
    Ok(files)
}

fn walk_matching(search_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ignore::Error> {
    let matcher = build_matcher(search_dir, pattern)?;

    let mut files: Vec<PathBuf> = WalkBuilder::new(search_dir)
        .standard_filters(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| matcher.matched(path, false).is_ignore())
        .collect();

    files.sort();
    log::debug!(
        "Found {} files matching {pattern} in {}",
        files.len(),
        search_dir.display()
    );
    Ok(files)
}

fn build_matcher(search_dir: &Path, pattern: &str) -> Result<Gitignore, ignore::Error> {
    let mut builder = GitignoreBuilder::new(search_dir);
    builder.add_line(None, pattern)?;
    builder.build()
}
