//! Terminal styling.
//!
//! - anstream for output that honours NO_COLOR, CLICOLOR_FORCE and non-tty
//!   destinations
//! - anstyle for composable styles
//! - color-print for message formatting

mod constants;
mod line;

pub use constants::*;
pub use line::{StyledLine, StyledString, truncate_with_ellipsis};

/// Auto-detecting println that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::println;

/// Auto-detecting eprintln that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::eprintln;
