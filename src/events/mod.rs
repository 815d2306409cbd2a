//! # Events Module
//!
//! The scanner and the sorting workflow report what they do through a
//! channel, so the terminal front end (or a test) can follow along without
//! the core knowing who is listening.

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
