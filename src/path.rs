use std::path::{Path, PathBuf};

/// The user's home directory, where `~/signal_list` is looked up.
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Expand a leading `~` in a configured path to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Format a trace path for messages.
///
/// Replaces the home directory prefix with `~` (`/home/me/traces/a.ship` -> `~/traces/a.ship`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}
