//! Identifier filter expressions.
//!
//! A filter is a comma-separated list of tokens, applied left to right:
//!
//! ```text
//! A4CI_, ^NC_, ~_REQ$        names matching A4CI_ or ^NC_, narrowed to _REQ$
//! REJ$, 43, 0x17000          union of a name pattern and two ids
//! -cfm$, 0x17000-0x17fff     ids in the range, never anything named *cfm
//! ```
//!
//! Each token is a decimal id or range, a hex id or range (`0x` prefix), or
//! a case-insensitive regex searched in the id's name (`<unknown>` for ids
//! without one). A `-` prefix removes matches and records them as explicitly
//! excluded, `~` keeps only matches, no prefix adds matches.
//!
//! The selection starts from every observed id only when the expression
//! opens with a `-` token and has no plain (union) token, so `-foo` alone
//! means "everything but foo" while `~foo` alone selects nothing. Explicit
//! exclusions always win.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};

use crate::names::{NameMap, UNKNOWN};
use crate::trace::{Trace, TraceEvent};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"\s*(?P<ex>[-~])?(?:(?P<dec>\d+)(?:\s*-\s*(?P<dec2>\d+))?|(?P<hex>0x[0-9a-f]+)(?:\s*-\s*(?P<hex2>0x[0-9a-f]+))?|(?P<str>[^, ][^,]*?))\s*(?:,+|$)",
    )
    .case_insensitive(true)
    .build()
    .expect("static regex")
});

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid filter '{expression}': {reason}")]
    InvalidSyntax { expression: String, reason: String },
}

/// How a token combines with the running selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Union,
    Intersect,
    Exclude,
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Range { lo: u32, hi: u32 },
    /// Compiled once, searched against every id in the universe.
    Name(Regex),
}

impl Matcher {
    pub fn matches(&self, id: u32, names: &NameMap) -> bool {
        match self {
            Self::Range { lo, hi } => (*lo..=*hi).contains(&id),
            Self::Name(pattern) => pattern.is_match(names.get(id).unwrap_or(UNKNOWN)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub op: Op,
    pub matcher: Matcher,
}

/// The outcome of evaluating a filter over a universe of ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub included: BTreeSet<u32>,
    pub excluded: BTreeSet<u32>,
}

/// A parsed filter expression.
#[derive(Debug, Clone, Default)]
pub struct IdFilter {
    tokens: Vec<Token>,
}

impl IdFilter {
    /// Parse an expression. A blank expression selects everything.
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        if expression.trim().is_empty() {
            return Ok(Self::default());
        }

        let tokens = TOKEN
            .captures_iter(expression)
            .map(|caps| parse_token(expression, &caps))
            .collect::<Result<Vec<_>, _>>()?;

        if tokens.is_empty() {
            return Err(FilterError::InvalidSyntax {
                expression: expression.to_string(),
                reason: "no filter terms found".to_string(),
            });
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn evaluate(&self, universe: &BTreeSet<u32>, names: &NameMap) -> FilterSelection {
        let starts_full = match self.tokens.first() {
            None => true,
            Some(first) => first.op == Op::Exclude && !self.tokens.iter().any(|t| t.op == Op::Union),
        };
        let mut included = if starts_full {
            universe.clone()
        } else {
            BTreeSet::new()
        };
        let mut excluded = BTreeSet::new();

        for token in &self.tokens {
            let matches = |id: &u32| token.matcher.matches(*id, names);
            match token.op {
                Op::Union => included.extend(universe.iter().copied().filter(matches)),
                Op::Intersect => included.retain(matches),
                Op::Exclude => {
                    included.retain(|id| !matches(id));
                    excluded.extend(universe.iter().copied().filter(matches));
                }
            }
        }

        included.retain(|id| !excluded.contains(id));
        FilterSelection { included, excluded }
    }
}

fn parse_token(expression: &str, caps: &Captures<'_>) -> Result<Token, FilterError> {
    let op = match caps.name("ex").map(|m| m.as_str()) {
        Some("-") => Op::Exclude,
        Some(_) => Op::Intersect,
        None => Op::Union,
    };

    let syntax_error = |reason: String| FilterError::InvalidSyntax {
        expression: expression.to_string(),
        reason,
    };

    let matcher = if let Some(pattern) = caps.name("str") {
        let pattern = pattern.as_str();
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| FilterError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;
        Matcher::Name(regex)
    } else if let Some(dec) = caps.name("dec") {
        let lo = parse_id(dec.as_str(), 10).map_err(&syntax_error)?;
        let hi = match caps.name("dec2") {
            Some(dec2) => parse_id(dec2.as_str(), 10).map_err(&syntax_error)?,
            None => lo,
        };
        Matcher::Range { lo, hi }
    } else if let Some(hex) = caps.name("hex") {
        let lo = parse_id(hex.as_str(), 16).map_err(&syntax_error)?;
        let hi = match caps.name("hex2") {
            Some(hex2) => parse_id(hex2.as_str(), 16).map_err(&syntax_error)?,
            None => lo,
        };
        Matcher::Range { lo, hi }
    } else {
        return Err(syntax_error(format!("unrecognized term '{}'", &caps[0])));
    };

    Ok(Token { op, matcher })
}

fn parse_id(text: &str, radix: u32) -> Result<u32, String> {
    let digits = if radix == 16 {
        text.get(2..).unwrap_or_default()
    } else {
        text
    };
    u32::from_str_radix(digits, radix).map_err(|e| format!("'{text}' is not a valid id: {e}"))
}

/// Evaluate `expression` over `universe`, resolving names through `names`.
pub fn evaluate_filter(
    expression: &str,
    universe: &BTreeSet<u32>,
    names: &NameMap,
) -> Result<FilterSelection, FilterError> {
    let filter = IdFilter::parse(expression)?;
    Ok(filter.evaluate(universe, names))
}

/// Mailbox side of a [`TraceFilter`].
#[derive(Debug, Clone, Default)]
pub enum MailboxFilter {
    #[default]
    Any,
    /// Sender or receiver selected, neither explicitly excluded.
    Single(IdFilter),
    /// `A:B` form: traffic between the two selections, in either direction.
    Dual(IdFilter, IdFilter),
}

impl MailboxFilter {
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        if expression.trim().is_empty() {
            return Ok(Self::Any);
        }
        let parts: Vec<&str> = expression.split(':').collect();
        match parts[..] {
            [single] => Ok(Self::Single(IdFilter::parse(single)?)),
            [a, b] => Ok(Self::Dual(IdFilter::parse(a)?, IdFilter::parse(b)?)),
            _ => Err(FilterError::InvalidSyntax {
                expression: expression.to_string(),
                reason: "expected at most one ':'".to_string(),
            }),
        }
    }
}

/// Signal and mailbox filters applied together to a trace.
#[derive(Debug, Clone, Default)]
pub struct TraceFilter {
    signals: IdFilter,
    mailboxes: MailboxFilter,
}

impl TraceFilter {
    pub fn new(signal_expr: Option<&str>, mailbox_expr: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            signals: IdFilter::parse(signal_expr.unwrap_or_default())?,
            mailboxes: MailboxFilter::parse(mailbox_expr.unwrap_or_default())?,
        })
    }

    /// True when neither side restricts anything.
    pub fn is_noop(&self) -> bool {
        self.signals.is_empty() && matches!(self.mailboxes, MailboxFilter::Any)
    }

    /// Keep the events selected by both filters.
    pub fn apply(&self, trace: Trace, signal_names: &NameMap, mailbox_names: &NameMap) -> Trace {
        if self.is_noop() {
            return trace;
        }

        let signals = self.signals.evaluate(&trace.signals(), signal_names).included;
        let mailbox_universe = trace.mailboxes();
        let keep_mailboxes: Box<dyn Fn(&TraceEvent) -> bool> = match &self.mailboxes {
            MailboxFilter::Any => Box::new(|_: &TraceEvent| true),
            MailboxFilter::Single(filter) => {
                let selection = filter.evaluate(&mailbox_universe, mailbox_names);
                Box::new(move |e: &TraceEvent| {
                    (selection.included.contains(&e.sender) || selection.included.contains(&e.receiver))
                        && !selection.excluded.contains(&e.sender)
                        && !selection.excluded.contains(&e.receiver)
                })
            }
            MailboxFilter::Dual(a, b) => {
                let a = a.evaluate(&mailbox_universe, mailbox_names);
                let b = b.evaluate(&mailbox_universe, mailbox_names);
                let excluded: BTreeSet<u32> = a.excluded.union(&b.excluded).copied().collect();
                let (a, b) = (a.included, b.included);
                Box::new(move |e: &TraceEvent| {
                    ((a.contains(&e.sender) && b.contains(&e.receiver))
                        || (b.contains(&e.sender) && a.contains(&e.receiver)))
                        && !excluded.contains(&e.sender)
                        && !excluded.contains(&e.receiver)
                })
            }
        };

        trace.retain(|e| signals.contains(&e.signo) && keep_mailboxes(e))
    }
}
