use crate::common::{TestTraces, exchange, stderr, stdout};

#[test]
fn test_present_json_from_show() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());
    let (signals, mailboxes) = traces.write_names();

    let output = traces
        .ship()
        .args(["show", "--format", "json", "--signals"])
        .arg(&signals)
        .arg("--mailboxes")
        .arg(&mailboxes)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let json = traces.root().join("events.json");
    std::fs::write(&json, &output.stdout).unwrap();

    let output = traces
        .ship()
        .arg("present")
        .arg(&json)
        .args(["--no-pager", "-g", "-d", "foo_server"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    let rows: Vec<&str> = stdout.lines().map(str::trim_end).collect();
    assert_eq!(rows.len(), 4, "{stdout}");
    assert!(rows[0].starts_with("Timestamp"));
    assert!(rows[0].ends_with("Signo"));
    assert!(rows[1].starts_with("2023-11-14 22:13:20.000250"));
    assert!(rows[1].contains("FOO_REQ"));
    // The paired receive is part of the JSON output
    assert!(rows[2].contains("FOO_REQ"));
    assert!(rows[3].contains("FOO_CFM"));
    assert!(rows[3].ends_with("94209"));
}

#[test]
fn test_present_orc_schema_time_filter() {
    let traces = TestTraces::new();
    let json = traces.root().join("orc.json");
    std::fs::write(
        &json,
        r#"{"events": [
          {"sender": {"name": "Dispatcher"}, "receiver": {"name": "Worker"},
           "name": "StartReq", "sent": "2024-05-01T09:59:59.000001Z", "receive_queue_len": 4},
          {"sender": {"name": "Worker"}, "receiver": {"name": "Dispatcher"},
           "name": "StartCfm", "received": "2024-05-01T10:00:01.000001Z", "receive_queue_len": 0}
        ]}"#,
    )
    .unwrap();

    let output = traces
        .ship()
        .arg("present")
        .arg(&json)
        .args(["--schema", "orc", "--no-pager", "-q", "-t", "10:00:00"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(rows.len(), 2, "{stdout}");
    assert!(rows[0].contains("Queue"));
    assert!(rows[1].contains("StartCfm"));
}

#[test]
fn test_present_rejects_bad_time() {
    let traces = TestTraces::new();
    let json = traces.root().join("events.json");
    std::fs::write(&json, "[]").unwrap();

    let output = traces
        .ship()
        .arg("present")
        .arg(&json)
        .args(["--no-pager", "-t", "noon"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid time 'noon'"));
}

#[test]
fn test_present_missing_file() {
    let traces = TestTraces::new();

    let output = traces
        .ship()
        .args(["present", "missing.json", "--no-pager"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read missing.json"));
}
