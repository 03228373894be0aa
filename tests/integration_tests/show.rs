use crate::common::{TestTraces, exchange, stderr, stdout};

#[test]
fn test_show_csv_with_names() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());
    let (signals, mailboxes) = traces.write_names();

    let output = traces
        .ship()
        .arg("show")
        .arg("--signals")
        .arg(&signals)
        .arg("--mailboxes")
        .arg(&mailboxes)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r"
    time, direction, queue_time, from_msgboxId, from_name, to_msgboxId, to_name, signalNumber, signalName, procId, connId
    2023-11-14 22:13:20.000250, S, +1.000000, 100, app_main, 200, foo_server, 0x17000, FOO_REQ, 1, 256
    2023-11-14 22:13:21.000250, S, <unknown>, 200, foo_server, 100, app_main, 0x17001, FOO_CFM, 1, 256
    2023-11-14 22:13:24.000250, R, <unknown>, 300, <unknown>, 100, app_main, 0x17a34, BAR_IND, 1, 256
    ");
}

#[test]
fn test_show_merges_text_and_binary_files() {
    let traces = TestTraces::new();
    let events = exchange();
    traces.write_binary("lm0.ship", &events[..1]);
    // The receive half of the first message, as a text trace
    traces.write("lm1.ship", "1700000001.000250 1 3 100 200 17000 \\x00\\x00\\x00\\x01\\x00\\x00\\x01\\x00\n");

    let output = traces.ship().args(["show", "--format", "text"]).output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r"
    1700000000.000250 0 3 100 200 0x17000 1 256
    1700000001.000250 1 3 100 200 0x17000 1 256
    ");
}

#[test]
fn test_show_prefix_argument() {
    let traces = TestTraces::new();
    let events = exchange();
    traces.write_binary("lm0.ship", &events[..1]);
    traces.write_binary("other.ship", &events[2..3]);

    let output = traces.ship().args(["show", "--format", "text", "lm"]).output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("0x17000"));
}

#[test]
fn test_show_json() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());
    let (signals, _) = traces.write_names();

    let output = traces
        .ship()
        .args(["show", "--format", "json", "--dont-convert-hex-data", "--signals"])
        .arg(&signals)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let events: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["signalName"], "FOO_REQ");
    assert_eq!(events[0]["procId"], r"\x00\x00\x00\x01");
    assert_eq!(events[3]["type"], 1);
}

#[test]
fn test_show_signal_filter() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());
    let (signals, _) = traces.write_names();

    let output = traces
        .ship()
        .args(["show", "--format", "text", "--signal-filter", "-_ind$, foo"])
        .arg("--signals")
        .arg(&signals)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert_eq!(stdout.lines().count(), 3, "{stdout}");
    assert!(!stdout.contains("0x17a34"));
}

#[test]
fn test_show_dual_mailbox_filter() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());

    let output = traces
        .ship()
        .args(["show", "--format", "text", "--mailbox-filter", "300:100"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @"1700000004.000250 1 3 300 100 0x17a34 1 256");
}

#[test]
fn test_show_summary() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());
    let (signals, mailboxes) = traces.write_names();

    let output = traces
        .ship()
        .args(["show", "--format", "summary", "--signals"])
        .arg(&signals)
        .arg("--mailboxes")
        .arg(&mailboxes)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.starts_with("# Signal"));
    assert!(stdout.contains("0x0017a34  BAR_IND"));
    assert!(stdout.contains("# Mailbox"));
}

#[test]
fn test_show_uml() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());

    let output = traces.ship().args(["show", "--format", "uml"]).output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.starts_with("@startuml\n"));
    assert!(stdout.contains("100 -> 200 :  0x17000"));
    assert!(stdout.trim_end().ends_with("@enduml"));
}

#[test]
fn test_show_nothing_selected() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());

    let output = traces
        .ship()
        .args(["show", "--signal-filter", "0x1-0x2"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("No signals selected!"));
}

#[test]
fn test_show_invalid_regex() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());

    let output = traces
        .ship()
        .args(["show", "--signal-filter", "foo(bar"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid regular expression 'foo(bar'"), "{}", stderr(&output));
}

#[test]
fn test_show_no_files() {
    let traces = TestTraces::new();

    let output = traces.ship().arg("show").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No ship files found!"));
}

#[test]
fn test_show_skips_invalid_files() {
    let traces = TestTraces::new();
    traces.write_binary("lm0.ship", &exchange());
    traces.write("broken.ship", b"\x00\x01\x02 not a trace");

    let output = traces.ship().args(["show", "--format", "text"]).output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).lines().count(), 4);
    assert!(stderr(&output).contains("broken.ship"), "{}", stderr(&output));
}

#[test]
fn test_show_malformed_text_fails() {
    let traces = TestTraces::new();
    traces.write("lm0.ship", "1700000000.000001 0 3 100 200 17000\nnot a record\n");

    let output = traces.ship().arg("show").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("lm0.ship:2:"), "{}", stderr(&output));
}
