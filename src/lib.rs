//! Transparent on-screen stopwatch overlay with a global keystroke display.
//!
//! The core is the chord display pipeline: a process-wide keyboard hook
//! ([`keyboard_hook`]) and the window's own input ([`local_keys`]) both feed
//! `(key, down|up)` events into the [`key_display`] state machine, which owns
//! the held-key set ([`chord`]) and drives the show/freeze/fade lifecycle of
//! the rendered chord label.

pub mod chord;
pub mod gui;
pub mod key_display;
pub mod keyboard_hook;
pub mod keys;
pub mod local_keys;
pub mod logging;
pub mod settings;
pub mod stopwatch;
