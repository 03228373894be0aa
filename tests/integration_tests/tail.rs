use std::process::Stdio;
use std::thread::sleep;
use std::time::Duration;

use shiptrace::trace::binary::encode_file;
use shiptrace::trace::{ByteOrder, SchemaVersion, Tag, Timestamp, TraceEvent};

use crate::common::{TestTraces, exchange, stderr, stdout};

fn unwritten() -> TraceEvent {
    TraceEvent {
        time: Timestamp::default(),
        source: 0,
        sender: 0,
        receiver: 0,
        signo: 0,
        proc_id: Tag::Bytes([0; 4]),
        conn_id: Tag::Bytes([0; 4]),
        ..exchange()[0].clone()
    }
}

/// Replace a ring file in one step so the monitor never reads a partial write.
fn replace_ring(traces: &TestTraces, name: &str, slots: &[TraceEvent]) {
    let staging = traces.traces().join("staging.tmp");
    std::fs::write(&staging, encode_file(slots, ByteOrder::Big, SchemaVersion::V2)).unwrap();
    std::fs::rename(&staging, traces.traces().join(name)).unwrap();
}

#[test]
fn test_tail_prints_only_new_events() {
    let traces = TestTraces::new();
    let events = exchange();
    replace_ring(&traces, "lm0.ship", &[events[0].clone(), unwritten(), unwritten()]);

    let mut child = traces
        .ship()
        .args(["tail", "--interval-ms", "20", "--niceness", "0"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    sleep(Duration::from_millis(500));
    replace_ring(
        &traces,
        "lm0.ship",
        &[events[0].clone(), events[2].clone(), unwritten()],
    );
    sleep(Duration::from_secs(1));

    child.kill().unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = stdout(&output);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["1700000001.000250 0 3 200 100 0x17001 1 256"],
        "{stdout}"
    );
    let stderr = stderr(&output);
    assert!(stderr.contains("Using input"), "{stderr}");
    assert!(stderr.contains("lm0.ship"), "{stderr}");
    assert!(!stderr.contains("may have been lost"), "{stderr}");
}
