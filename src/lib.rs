pub mod config;
pub mod discover;
pub mod filter;
pub mod names;
pub mod pager;
pub mod path;
pub mod render;
pub mod styling;
pub mod tail;
pub mod trace;

pub use filter::{FilterError, FilterSelection, IdFilter, TraceFilter, evaluate_filter};
pub use tail::{PollReport, TailDiagnostic, TailError, TailMonitor};
pub use trace::{Trace, TraceError, TraceEvent, clear, decode, load};
