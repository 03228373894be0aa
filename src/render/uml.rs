//! PlantUML sequence diagram.
//!
//! Mailboxes that send or receive locally (the trace's own side) are boxed
//! as "Application"; every other mailbox follows as a plain participant.

use std::collections::BTreeSet;

use super::Renderer;
use crate::names::NameMap;
use crate::trace::{EventKind, Trace};

/// Reply-like signals get a dashed arrow.
const REPLY_SUFFIXES: &[&str] = &["CFM", "REJ", "_R", "ACK", "REPLY", "RSP"];
/// One-way signals get an open arrowhead.
const ONE_WAY_SUFFIXES: &[&str] = &["IND", "FWD"];

pub fn render(trace: &Trace, renderer: &Renderer<'_>) -> String {
    let items: Vec<_> = trace.without_duplicates().collect();

    let local: BTreeSet<u32> = items
        .iter()
        .filter_map(|item| match item.event.kind {
            EventKind::Send => Some(item.event.sender),
            EventKind::Receive => Some(item.event.receiver),
            EventKind::Other(_) => None,
        })
        .collect();
    let all: BTreeSet<u32> = items
        .iter()
        .flat_map(|item| [item.event.sender, item.event.receiver])
        .collect();

    let mut out = String::new();
    let mut line = |text: &str| {
        out.push_str(text);
        out.push('\n');
    };

    line("@startuml");
    line("skinparam defaultFontName Consolas");
    line("skinparam defaultFontSize 14");
    line("skinparam backgroundColor white");
    line("skinparam arrowColor darkred");
    line("box \"Application\"");
    for &mailbox in &local {
        line(&participant(mailbox, renderer.mailboxes));
    }
    line("end box");
    line("");
    for &mailbox in all.difference(&local) {
        line(&participant(mailbox, renderer.mailboxes));
    }
    line("");
    line("");

    let mut last_seconds = items.first().map_or(0, |item| item.event.time.seconds);
    for item in &items {
        let event = item.event;
        let gap = event.time.seconds.saturating_sub(last_seconds);
        if gap > 1 {
            line(&format!("...{gap} second(s) passed..."));
        }
        last_seconds = event.time.seconds;

        let signal = match renderer.signals.get(event.signo) {
            Some(name) => name.to_string(),
            None => format!("0x{:x}", event.signo),
        };
        line(&format!(
            "{} {} {} :  {}",
            event.sender,
            arrow(&signal),
            event.receiver,
            signal
        ));
    }

    line("== Memory was dumped! ==");
    line("@enduml");
    out
}

fn participant(mailbox: u32, names: &NameMap) -> String {
    match names.get(mailbox) {
        Some(name) => format!("participant \"{name}\\n{mailbox}\" as {mailbox}"),
        None => format!("participant {mailbox}"),
    }
}

fn arrow(signal: &str) -> String {
    let upper = signal.to_uppercase();
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| upper.ends_with(s));

    let shaft = if ends_with_any(REPLY_SUFFIXES) { "--" } else { "-" };
    let color = if upper.ends_with("REJ") { "[#red]" } else { "" };
    let head = if ends_with_any(ONE_WAY_SUFFIXES) { ">>" } else { ">" };
    format!("{shaft}{color}{head}")
}
