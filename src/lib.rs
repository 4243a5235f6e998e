//! A scientific calculator session with persistent memory slots, a bounded
//! history and an answer register, plus a length unit converter.

pub mod calculator;
pub mod config;
pub mod converter;
pub mod error;
pub mod repl;
pub mod storage;

pub use calculator::{Evaluation, Session, Slot};
pub use config::Config;
pub use storage::{CalculatorRepository, FileStore, InMemoryStore, KeyValueStore};
