//! ABOUTME: Frame-timing sample collection from browser console lines
//! ABOUTME: Per-loop session state machine with one-shot completion signalling

pub mod parse;
pub mod session;

pub use parse::parse_sample;
pub use session::{Phase, Session};
