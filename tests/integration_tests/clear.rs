use shiptrace::trace::format::HEADER_LEN;

use crate::common::{TestTraces, exchange, stderr, stdout};

#[test]
fn test_clear_zeroes_records_and_keeps_header() {
    let traces = TestTraces::new();
    let path = traces.write_binary("lm0.ship", &exchange());
    let before = std::fs::read(&path).unwrap();

    let output = traces.ship().arg("clear").output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Clearing 1 files\n");

    let after = std::fs::read(&path).unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[..HEADER_LEN], before[..HEADER_LEN]);
    assert!(after[HEADER_LEN..].iter().all(|&b| b == 0));

    // Every slot is now unwritten
    let output = traces.ship().arg("show").output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).lines().count(), 1);
}

#[test]
fn test_clear_refuses_invalid_file() {
    let traces = TestTraces::new();
    let valid = traces.write_binary("lm0.ship", &exchange());
    let invalid = traces.write("lm1.ship", b"\x01\x02\x03\x04\x00no magic here");

    let output = traces.ship().args(["clear", "lm"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "Clearing 2 files\n");
    let stderr = stderr(&output);
    assert!(stderr.contains("refusing to clear"), "{stderr}");
    assert!(stderr.contains("1 of 2 files could not be cleared"), "{stderr}");

    assert_eq!(std::fs::read(&invalid).unwrap(), b"\x01\x02\x03\x04\x00no magic here");
    assert!(std::fs::read(&valid).unwrap()[HEADER_LEN..].iter().all(|&b| b == 0));
}
