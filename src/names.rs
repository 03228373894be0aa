//! Mailbox and signal name lookup tables.
//!
//! Both tables are plain `id -> name` maps. A missing id is not an error;
//! it renders as [`UNKNOWN`].

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;

/// Rendered in place of a name that no table knows.
pub const UNKNOWN: &str = "<unknown>";

/// Header columns of `um list` output are separated by two or more spaces.
static COLUMN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("static regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    names: HashMap<u32, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn name_or_unknown(&self, id: u32) -> &str {
        self.get(id).unwrap_or(UNKNOWN)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.names.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }
}

/// Parse a mailbox table in `um list` layout.
///
/// The first line is a header; the columns whose titles contain `Id` and
/// `Name` say where to look in every following line. Rows that are too
/// short or whose id is not a decimal integer are skipped.
pub fn parse_mailbox_table(reader: impl BufRead) -> std::io::Result<NameMap> {
    let mut lines = reader.lines();
    let Some(header) = lines.next().transpose()? else {
        return Ok(NameMap::new());
    };

    let mut id_index = 0;
    let mut name_index = 0;
    for (idx, column) in COLUMN_SEPARATOR.split(header.trim_start()).enumerate() {
        if column.contains("Id") {
            id_index = idx;
        }
        if column.contains("Name") {
            name_index = idx;
        }
    }

    let mut mailboxes = NameMap::new();
    for line in lines {
        let line = line?;
        let columns: Vec<&str> = line.split_whitespace().collect();
        let (Some(id), Some(name)) = (columns.get(id_index), columns.get(name_index)) else {
            continue;
        };
        match id.parse::<u32>() {
            Ok(id) => mailboxes.insert(id, *name),
            Err(_) => log::debug!("Skipping mailbox row with id '{id}'"),
        }
    }
    Ok(mailboxes)
}

/// Parse a signal list of `NAME HEX DEC` lines. The first name for a number wins.
pub fn parse_signal_list(reader: impl BufRead) -> std::io::Result<NameMap> {
    let mut signals = NameMap::new();
    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [name, _, number, ..] = fields[..] else {
            if !fields.is_empty() {
                log::debug!("Skipping signal list line '{line}'");
            }
            continue;
        };
        let Ok(signo) = number.parse::<u32>() else {
            log::debug!("Skipping signal list line '{line}'");
            continue;
        };
        if !signals.contains(signo) {
            signals.insert(signo, name);
        }
    }
    Ok(signals)
}

pub fn read_mailbox_file(path: &Path) -> std::io::Result<NameMap> {
    parse_mailbox_table(std::io::BufReader::new(std::fs::File::open(path)?))
}

pub fn read_signal_file(path: &Path) -> std::io::Result<NameMap> {
    parse_signal_list(std::io::BufReader::new(std::fs::File::open(path)?))
}

/// Mailbox names of the running node, from `um list`.
///
/// Returns an empty table when `um` is not installed or fails.
pub fn system_mailboxes() -> NameMap {
    let output = match Command::new("um")
        .arg("list")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            log::debug!("Not reading mailboxes from `um list`: {e}");
            return NameMap::new();
        }
    };

    parse_mailbox_table(output.stdout.as_slice()).unwrap_or_else(|e| {
        log::debug!("Failed to parse `um list` output: {e}");
        NameMap::new()
    })
}

/// Default signal list: `~/signal_list`, else `signal_list` next to the executable.
pub fn find_signal_file() -> Option<PathBuf> {
    let home_file = crate::path::home_dir().map(|home| home.join("signal_list"));
    let installed_file = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(|dir| dir.join("signal_list")));

    [home_file, installed_file]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mailbox_table() {
        let table = "\
  Id        Name              State
  4097      FOO_MAIN          active
  4098      BAR_PROXY         active
  garbage
  xyz       NOT_A_NUMBER      active
";
        let mailboxes = parse_mailbox_table(table.as_bytes()).unwrap();
        assert_eq!(mailboxes.len(), 2);
        assert_eq!(mailboxes.get(4097), Some("FOO_MAIN"));
        assert_eq!(mailboxes.name_or_unknown(4098), "BAR_PROXY");
        assert_eq!(mailboxes.name_or_unknown(1), UNKNOWN);
    }

    #[test]
    fn test_mailbox_columns_follow_header() {
        let table = "Name    Mailbox Id\nFOO     17\n";
        let mailboxes = parse_mailbox_table(table.as_bytes()).unwrap();
        assert_eq!(mailboxes.get(17), Some("FOO"));
    }

    #[test]
    fn test_empty_mailbox_table() {
        assert!(parse_mailbox_table("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_signal_list_first_name_wins() {
        let list = "\
FOO_REQ 0x17000 94208
FOO_ALIAS 0x17000 94208

BROKEN_LINE
BAD_DEC 0x1 one
FOO_CFM 0x17001 94209
";
        let signals = parse_signal_list(list.as_bytes()).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals.get(0x17000), Some("FOO_REQ"));
        assert_eq!(signals.get(0x17001), Some("FOO_CFM"));
    }
}
