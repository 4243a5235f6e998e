//! Scientific calculator core.
//!
//! This module provides:
//! - An editable expression buffer with a cursor
//! - Live evaluation of the buffer using fasteval
//! - Twelve named memory slots, a bounded history and an answer register
//! - A [`Session`] tying them together with best-effort persistence

mod answer;
mod buffer;
mod clipboard;
mod evaluation;
mod history;
pub mod keypad;
mod memory;
mod session;

pub use answer::{AnswerRegister, DEFAULT_ANSWER};
pub use buffer::ExpressionBuffer;
pub use clipboard::copy_to_clipboard;
pub use evaluation::{ERROR_DISPLAY, Evaluation, evaluate};
pub use history::{HISTORY_CAPACITY, HistoryEntry, HistoryLog};
pub use memory::{MemoryBank, Slot, is_saveable};
pub use session::{Seed, Session};
