//! Text trace parsing.
//!
//! One record per line, `#` starts a comment:
//!
//! ```text
//! SECONDS.MICROSECONDS TYPE SOURCE SENDER RECEIVER SIGNO_HEX [PROCCONN | PROC CONN]
//! ```
//!
//! The optional tail takes one of three shapes:
//! - one 32-character token: eight `\xHH` escapes, `procId` then `connId`;
//! - one token of any other length: the same escapes as written by an old
//!   writer that sign-extended bytes to `\xffffffHH`. Only the low byte of
//!   each escape is kept;
//! - two decimal integers used directly as `procId` and `connId`.
//!
//! A line that fails to parse fails the whole file.

use super::event::{EventKind, Tag, Timestamp, TraceEvent};

/// Length of a well-formed `procId`+`connId` escape token.
const ESCAPED_TAGS_LEN: usize = 32;

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

/// Parse a whole text trace. Blank and comment-only lines are skipped.
pub fn parse_lines(input: &str) -> Result<Vec<TraceEvent>, LineError> {
    input
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            parse_line(line)
                .map_err(|reason| LineError {
                    line: idx + 1,
                    reason,
                })
                .transpose()
        })
        .collect()
}

/// Parse one line. Returns `Ok(None)` for lines without a record.
pub fn parse_line(line: &str) -> Result<Option<TraceEvent>, String> {
    let content = line.split('#').next().unwrap_or_default();
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < 6 {
        return Err(format!(
            "expected at least 6 fields, found {}",
            fields.len()
        ));
    }

    let time = parse_timestamp(fields[0])?;
    let kind = parse_decimal::<u32>(fields[1], "type")?;
    let source = parse_decimal::<u32>(fields[2], "source")?;
    let sender = parse_decimal::<u32>(fields[3], "sender")?;
    let receiver = parse_decimal::<u32>(fields[4], "receiver")?;
    let signo = parse_hex(fields[5])?;

    let (proc_id, conn_id) = match &fields[6..] {
        // Only an ASCII token can be the 32-character form
        [token] if token.len() == ESCAPED_TAGS_LEN && token.is_ascii() => {
            let (proc_half, conn_half) = token.split_at(ESCAPED_TAGS_LEN / 2);
            (
                Tag::Bytes(decode_escaped(proc_half)?),
                Tag::Bytes(decode_escaped(conn_half)?),
            )
        }
        [token] => repair_sign_extended(token)?,
        [proc_id, conn_id] => (
            Tag::Number(parse_decimal(proc_id, "procId")?),
            Tag::Number(parse_decimal(conn_id, "connId")?),
        ),
        _ => (Tag::Empty, Tag::Empty),
    };

    Ok(Some(TraceEvent {
        kind: EventKind::from_raw(kind),
        source,
        sender,
        receiver,
        time,
        signo,
        proc_id,
        conn_id,
        pair: None,
    }))
}

fn parse_timestamp(field: &str) -> Result<Timestamp, String> {
    let Some((seconds, microseconds)) = field.split_once('.') else {
        return Err(format!("invalid timestamp '{field}'"));
    };
    let seconds = seconds
        .parse()
        .map_err(|_| format!("invalid timestamp '{field}'"))?;
    let microseconds = microseconds
        .parse()
        .map_err(|_| format!("invalid timestamp '{field}'"))?;
    Ok(Timestamp::new(seconds, microseconds))
}

fn parse_decimal<T: std::str::FromStr>(field: &str, what: &str) -> Result<T, String> {
    field
        .parse()
        .map_err(|_| format!("invalid {what} '{field}'"))
}

fn parse_hex(field: &str) -> Result<u32, String> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u32::from_str_radix(digits, 16).map_err(|_| format!("invalid signo '{field}'"))
}

/// Decode exactly four `\xHH` escapes.
fn decode_escaped(half: &str) -> Result<[u8; 4], String> {
    let bytes = escape_values(half)?
        .into_iter()
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| format!("escape '\\x{v:x}' in '{half}' does not fit in a byte"))
        })
        .collect::<Result<Vec<u8>, String>>()?;
    bytes
        .try_into()
        .map_err(|_| format!("expected four \\xHH escapes in '{half}'"))
}

/// Undo the sign-extension bug: `\xffffff01...` becomes `\x01...`.
fn repair_sign_extended(token: &str) -> Result<(Tag, Tag), String> {
    let low_bytes: Vec<u8> = escape_values(token)?
        .into_iter()
        .map(|v| (v & 0xff) as u8)
        .collect();
    let [p0, p1, p2, p3, c0, c1, c2, c3] = low_bytes[..] else {
        return Err(format!(
            "expected eight escaped bytes in '{token}', found {}",
            low_bytes.len()
        ));
    };
    Ok((Tag::Bytes([p0, p1, p2, p3]), Tag::Bytes([c0, c1, c2, c3])))
}

/// Split on `\x` and parse each run as hex. Text before the first escape is
/// ignored, matching how the legacy writer's output was read back.
fn escape_values(token: &str) -> Result<Vec<u64>, String> {
    token
        .split("\\x")
        .skip(1)
        .map(|run| {
            u64::from_str_radix(run, 16).map_err(|_| format!("invalid escape '\\x{run}' in '{token}'"))
        })
        .collect()
}

/// Write one record in text form (the inverse of [`parse_line`]).
pub fn format_line(event: &TraceEvent) -> String {
    let mut line = format!(
        "{} {} {} {} {} 0x{:x}",
        event.time,
        event.kind.raw(),
        event.source,
        event.sender,
        event.receiver,
        event.signo
    );
    match (&event.proc_id, &event.conn_id) {
        (Tag::Empty, Tag::Empty) => {}
        (Tag::Number(p), Tag::Number(c)) => line.push_str(&format!(" {p} {c}")),
        (proc_id, conn_id) => {
            line.push(' ');
            line.push_str(&proc_id.escaped());
            line.push_str(&conn_id.escaped());
        }
    }
    line
}
