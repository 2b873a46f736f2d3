#![forbid(unsafe_code)]

//! Headless VT/ANSI terminal engine.
//!
//! `emberterm-core` is a platform-independent terminal model: it consumes
//! the byte stream coming out of a pseudo-terminal master, keeps the screen
//! state in memory, and notifies its host about what changed — all without
//! any I/O dependencies of its own.
//!
//! # Primary responsibilities
//!
//! - **Screen**: fixed 2D cell grid (main + alternate) with cursor state.
//! - **Cell**: one ASCII byte, a 16-slot ANSI color pair, protection flag.
//! - **Parser**: VT/ANSI state machine for CSI/OSC/ESC dispatch.
//! - **Emulator**: grid mutation, scroll region, replies, host callbacks.
//! - **Scrollback**: fixed ring of history rows with a view offset.
//! - **Keys**: host key events encoded as VT byte sequences.
//!
//! # Design principles
//!
//! - **No I/O**: the host adapter owns the PTY and the renderer; the engine
//!   only transforms bytes into state and notifications.
//! - **Deterministic**: identical byte sequences always produce identical
//!   state.
//! - **Infallible**: malformed input is absorbed, never surfaced as errors.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.
//!
//! # Example
//!
//! ```
//! use emberterm_core::Emulator;
//!
//! let mut term = Emulator::new(24, 80);
//! term.feed(b"hello\x1b[2;1Hworld");
//! assert_eq!(term.row_data(1).unwrap()[0].ch, b'w');
//! assert_eq!((term.cursor_row(), term.cursor_column()), (1, 5));
//! ```

pub mod cell;
pub mod emulator;
pub mod keys;
pub mod logging;
pub mod parser;
pub mod screen;
pub mod scrollback;

pub use cell::{Cell, CellFlags, Color};
pub use emulator::{Emulator, Host, NullHost};
pub use keys::{Key, Modifiers};
pub use parser::{Action, CsiSequence, Parser};
pub use screen::Screen;
pub use scrollback::{SCROLLBACK_LINES, Scrollback};
