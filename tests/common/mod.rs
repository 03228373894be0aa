//! Fixtures for running the `ship` binary against temporary trace files.
//!
//! Every command runs with an isolated search directory, home directory and
//! config path, so nothing on the host leaks into the output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use shiptrace::trace::binary::encode_file;
use shiptrace::trace::{ByteOrder, EventKind, SchemaVersion, Tag, Timestamp, TraceEvent};
use tempfile::TempDir;

pub const SIGNAL_LIST: &str = "\
FOO_REQ 0x17000 94208
FOO_CFM 0x17001 94209
BAR_IND 0x17a34 96820
";

pub const MAILBOX_TABLE: &str = "\
  Id        Name              State
  100       app_main          active
  200       foo_server        active
";

pub struct TestTraces {
    dir: TempDir,
}

impl TestTraces {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("home")).unwrap();
        std::fs::create_dir(dir.path().join("traces")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory searched for `*.ship` files.
    pub fn traces(&self) -> PathBuf {
        self.root().join("traces")
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.traces().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_binary(&self, name: &str, events: &[TraceEvent]) -> PathBuf {
        self.write(name, encode_file(events, ByteOrder::Big, SchemaVersion::V2))
    }

    /// Signal list and mailbox table, outside the search directory.
    pub fn write_names(&self) -> (PathBuf, PathBuf) {
        let signals = self.root().join("signal_list");
        let mailboxes = self.root().join("mailbox_list");
        std::fs::write(&signals, SIGNAL_LIST).unwrap();
        std::fs::write(&mailboxes, MAILBOX_TABLE).unwrap();
        (signals, mailboxes)
    }

    pub fn ship(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ship"));
        cmd.current_dir(self.root())
            .env("APP_TMP", self.traces())
            .env("HOME", self.root().join("home"))
            .env("SHIPTRACE_CONFIG_PATH", self.root().join("no-config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

pub fn event(kind: EventKind, seconds: u32, sender: u32, receiver: u32, signo: u32) -> TraceEvent {
    TraceEvent {
        kind,
        source: 3,
        sender,
        receiver,
        time: Timestamp::new(seconds, 250),
        signo,
        proc_id: Tag::Bytes([0, 0, 0, 1]),
        conn_id: Tag::Bytes([0, 0, 1, 0]),
        pair: None,
    }
}

/// A request, its receive, the confirm back and an indication from an unknown mailbox.
pub fn exchange() -> Vec<TraceEvent> {
    vec![
        event(EventKind::Send, 1_700_000_000, 100, 200, 0x17000),
        event(EventKind::Receive, 1_700_000_001, 100, 200, 0x17000),
        event(EventKind::Send, 1_700_000_001, 200, 100, 0x17001),
        event(EventKind::Receive, 1_700_000_004, 300, 100, 0x17a34),
    ]
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
