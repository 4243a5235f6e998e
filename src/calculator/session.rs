//! The scientific calculator screen state.
//!
//! A [`Session`] owns the expression buffer and the value displayed for it,
//! together with the memory slots, history and answer register. Every edit
//! re-evaluates the buffer. Changes to persisted state are applied in memory
//! first and then written through the [`CalculatorRepository`]; a failed
//! write is logged and the in-memory state stays authoritative.

use super::keypad;
use super::{
    AnswerRegister, Evaluation, ExpressionBuffer, HistoryEntry, HistoryLog, MemoryBank, Slot,
    evaluate,
};
use crate::error::{SessionError, StoreError};
use crate::storage::CalculatorRepository;
use tracing::{debug, info, warn};

/// An expression and result handed over from the history screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed {
    pub expression: String,
    pub result: String,
}

impl From<&HistoryEntry> for Seed {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            expression: entry.expression.clone(),
            result: entry.result.clone(),
        }
    }
}

pub struct Session {
    buffer: ExpressionBuffer,
    result: Evaluation,
    memory: MemoryBank,
    history: HistoryLog,
    answer: AnswerRegister,
    pending_seed: Option<Seed>,
    repo: CalculatorRepository,
}

impl Session {
    /// Start a session with default state, without reading the store.
    pub fn new(repo: CalculatorRepository) -> Self {
        Self {
            buffer: ExpressionBuffer::new(),
            result: Evaluation::Empty,
            memory: MemoryBank::new(),
            history: HistoryLog::new(),
            answer: AnswerRegister::new(),
            pending_seed: None,
            repo,
        }
    }

    /// Start a session and overwrite the defaults with whatever was last
    /// persisted. Unreadable values are logged and left at their defaults.
    pub fn restore(repo: CalculatorRepository) -> Self {
        let mut session = Self::new(repo);

        if let Some(answer) = loaded("answer", session.repo.load_answer()) {
            session.answer.set(answer);
        }
        if let Some(memory) = loaded("memory", session.repo.load_memory()) {
            session.memory = memory;
        }
        if let Some(history) = loaded("history", session.repo.load_history()) {
            session.history = history;
        }

        debug!(
            answer = session.answer.get(),
            saved_slots = session.memory.iter().filter(|(_, v)| !v.is_empty()).count(),
            history = session.history.len(),
            "calculator session restored"
        );
        session
    }

    pub fn buffer(&self) -> &ExpressionBuffer {
        &self.buffer
    }

    /// The value currently displayed under the buffer.
    pub fn result(&self) -> &Evaluation {
        &self.result
    }

    pub fn memory(&self) -> &MemoryBank {
        &self.memory
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn answer(&self) -> &str {
        self.answer.get()
    }

    pub fn has_any_saved(&self) -> bool {
        self.memory.has_any_saved()
    }

    /// Insert a token at the cursor.
    pub fn insert(&mut self, token: &str) {
        self.buffer.insert(token);
        self.refresh();
    }

    /// Press a keypad button by its label.
    pub fn press_key(&mut self, label: &str) -> Result<(), SessionError> {
        let token = keypad::token_for(label)
            .ok_or_else(|| SessionError::UnknownKey(label.to_string()))?;
        self.insert(token);
        Ok(())
    }

    pub fn move_left(&mut self) {
        self.buffer.move_left();
        self.refresh();
    }

    pub fn move_right(&mut self) {
        self.buffer.move_right();
        self.refresh();
    }

    pub fn backspace(&mut self) {
        if self.buffer.backspace() {
            self.refresh();
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.refresh();
    }

    /// Insert the answer register at the cursor.
    ///
    /// Does nothing when there is no answer worth inserting.
    pub fn insert_answer(&mut self) -> bool {
        if !self.answer.is_insertable() {
            return false;
        }

        let answer = self.answer.get().to_string();
        self.insert(&answer);
        true
    }

    /// Copy the answer register into `slot`.
    pub fn save_to_slot(&mut self, slot: Slot) -> Result<(), SessionError> {
        self.memory.save(slot, self.answer.get())?;
        debug!(%slot, value = self.answer.get(), "saved answer to memory");
        self.persist_memory();
        Ok(())
    }

    /// Insert the value of `slot` at the cursor. The slot is left unchanged.
    pub fn use_slot(&mut self, slot: Slot) -> Result<(), SessionError> {
        let value = self.memory.use_slot(slot)?.to_string();
        self.insert(&value);
        Ok(())
    }

    /// Empty every memory slot and reset the answer register.
    pub fn reset_all(&mut self) {
        self.memory.reset();
        self.answer.reset();
        info!("memory and answer register reset");
        self.persist_memory();
        self.persist_answer();
    }

    /// Finalize the buffer: log it, update the answer and clear the buffer.
    ///
    /// An empty buffer is not committed. A failed evaluation is logged with
    /// an empty result and leaves the answer register untouched.
    pub fn commit(&mut self) -> Option<HistoryEntry> {
        if self.buffer.text().trim().is_empty() {
            return None;
        }

        let result = match self.result.value().map(str::to_string) {
            Some(value) => {
                self.answer.set(value.clone());
                self.persist_answer();
                value
            }
            None => String::new(),
        };

        let entry = self.history.append(self.buffer.text(), &result).clone();
        debug!(expression = %entry.expression, result = %entry.result, "committed calculation");
        self.persist_history();

        self.clear();
        Some(entry)
    }

    /// Hand over an expression to resume. It is applied by the next call to
    /// [`Session::apply_pending_seed`], and only once.
    pub fn offer_seed(&mut self, seed: Seed) {
        self.pending_seed = Some(seed);
    }

    /// Offer the history entry at `index` (0 is the newest) as a seed.
    pub fn recall(&mut self, index: usize) -> Result<(), SessionError> {
        let seed = self
            .history
            .get(index)
            .map(Seed::from)
            .ok_or(SessionError::NoSuchEntry(index + 1))?;
        self.offer_seed(seed);
        Ok(())
    }

    /// Consume the pending seed, if any.
    ///
    /// The buffer takes the seed's expression with the cursor at its end and
    /// the displayed value is the seed's result as handed over.
    pub fn apply_pending_seed(&mut self) -> bool {
        let Some(seed) = self.pending_seed.take() else {
            return false;
        };

        debug!(expression = %seed.expression, "resuming calculation");
        self.buffer = ExpressionBuffer::from_text(seed.expression);
        self.result = Evaluation::from_display(&seed.result);
        true
    }

    fn refresh(&mut self) {
        self.result = evaluate(self.buffer.text());
    }

    fn persist_answer(&self) {
        if let Err(err) = self.repo.save_answer(self.answer.get()) {
            warn!(error = %err, "failed to persist answer register");
        }
    }

    fn persist_memory(&self) {
        if let Err(err) = self.repo.save_memory(&self.memory) {
            warn!(error = %err, "failed to persist memory slots");
        }
    }

    fn persist_history(&self) {
        if let Err(err) = self.repo.save_history(&self.history) {
            warn!(error = %err, "failed to persist history");
        }
    }
}

fn loaded<T>(what: &str, result: Result<Option<T>, StoreError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "failed to load persisted {what}, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryStore, KeyValueStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Wraps an in-memory store, counting writes and failing on demand.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryStore,
        writes: AtomicUsize,
        failing: AtomicBool,
    }

    impl KeyValueStore for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk on fire".to_string()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
    }

    fn session() -> (Arc<RecordingStore>, Session) {
        let store = Arc::new(RecordingStore::default());
        let session = Session::restore(CalculatorRepository::new(store.clone()));
        (store, session)
    }

    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            session.insert(c.encode_utf8(&mut [0; 4]));
        }
    }

    #[test]
    fn test_live_evaluation() {
        let (_, mut session) = session();
        assert_eq!(session.result(), &Evaluation::Empty);

        type_text(&mut session, "2+");
        assert_eq!(session.result().display(), "Error");

        session.insert("2");
        assert_eq!(session.result().display(), "4");

        session.backspace();
        session.backspace();
        session.backspace();
        assert_eq!(session.result(), &Evaluation::Empty);
    }

    #[test]
    fn test_commit_updates_answer_and_history() {
        let (store, mut session) = session();
        type_text(&mut session, "6*7");

        let entry = session.commit().unwrap();
        assert_eq!(entry.expression, "6*7");
        assert_eq!(entry.result, "42");
        assert_eq!(session.answer(), "42");
        assert!(session.buffer().is_empty());
        assert_eq!(session.result(), &Evaluation::Empty);
        assert_eq!(store.get("answer").unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn test_commit_error_logs_empty_result() {
        let (store, mut session) = session();
        type_text(&mut session, "3*(4+5");
        assert!(session.result().is_error());

        let entry = session.commit().unwrap();
        assert_eq!(entry.expression, "3*(4+5");
        assert_eq!(entry.result, "");
        assert_eq!(session.answer(), "0");
        assert_eq!(store.get("answer").unwrap(), None);
        assert_eq!(session.history().entries()[0], entry);
    }

    #[test]
    fn test_commit_empty_buffer_is_noop() {
        let (store, mut session) = session();
        assert_eq!(session.commit(), None);
        assert!(session.history().is_empty());
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_history_caps_at_ten() {
        let (_, mut session) = session();
        for i in 1..=11 {
            type_text(&mut session, &format!("{i}*1"));
            session.commit();
        }

        let history = session.history().entries();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].expression, "11*1");
        assert!(history.iter().all(|entry| entry.expression != "1*1"));
    }

    #[test]
    fn test_save_and_use_slot() {
        let (_, mut session) = session();
        type_text(&mut session, "2+3");
        session.commit();
        session.save_to_slot(Slot::A).unwrap();

        type_text(&mut session, "10-");
        session.use_slot(Slot::A).unwrap();
        assert_eq!(session.buffer().text(), "10-5");
        assert_eq!(session.buffer().cursor(), 4);
        assert_eq!(session.result().display(), "5");
        assert_eq!(session.memory().get(Slot::A), "5");
    }

    #[test]
    fn test_use_slot_inserts_at_cursor() {
        let (_, mut session) = session();
        type_text(&mut session, "9*9");
        session.commit();
        session.save_to_slot(Slot::B).unwrap();

        type_text(&mut session, "1+");
        session.move_left();
        session.use_slot(Slot::B).unwrap();
        assert_eq!(session.buffer().text(), "181+");
        assert_eq!(session.buffer().cursor(), 3);
    }

    #[test]
    fn test_save_rejected_without_answer() {
        let (store, mut session) = session();
        assert_eq!(session.save_to_slot(Slot::C), Err(SessionError::NothingToSave));
        assert!(!session.has_any_saved());
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_use_empty_slot_changes_nothing() {
        let (_, mut session) = session();
        type_text(&mut session, "1+");
        assert_eq!(session.use_slot(Slot::F), Err(SessionError::EmptySlot(Slot::F)));
        assert_eq!(session.buffer().text(), "1+");
    }

    #[test]
    fn test_reset_all() {
        let (store, mut session) = session();
        type_text(&mut session, "8");
        session.commit();
        session.save_to_slot(Slot::L).unwrap();

        session.reset_all();
        assert!(!session.has_any_saved());
        assert_eq!(session.answer(), "0");
        assert_eq!(store.get("answer").unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_reset_all_survives_restart() {
        let (store, mut session) = session();
        type_text(&mut session, "8");
        session.commit();
        session.save_to_slot(Slot::L).unwrap();
        session.save_to_slot(Slot::A).unwrap();

        session.reset_all();
        drop(session);

        let restored = Session::restore(CalculatorRepository::new(store));
        assert!(!restored.has_any_saved());
        assert_eq!(restored.memory().get(Slot::L), "");
        assert_eq!(restored.answer(), "0");
    }

    #[test]
    fn test_save_after_reset_wins() {
        let (store, mut session) = session();
        type_text(&mut session, "2*2");
        session.commit();
        session.save_to_slot(Slot::B).unwrap();
        session.reset_all();

        type_text(&mut session, "3*3");
        session.commit();
        session.save_to_slot(Slot::C).unwrap();
        drop(session);

        let restored = Session::restore(CalculatorRepository::new(store));
        assert_eq!(restored.memory().get(Slot::B), "");
        assert_eq!(restored.memory().get(Slot::C), "9");
        assert_eq!(restored.answer(), "9");
    }

    #[test]
    fn test_tiny_answer_can_be_saved() {
        let (_, mut session) = session();
        type_text(&mut session, "1/10^12");
        session.commit();
        assert_eq!(session.answer(), "1e-12");

        session.save_to_slot(Slot::E).unwrap();
        type_text(&mut session, "2*");
        session.use_slot(Slot::E).unwrap();
        assert_eq!(session.result().display(), "2e-12");
    }

    #[test]
    fn test_insert_answer() {
        let (_, mut session) = session();
        assert!(!session.insert_answer());

        type_text(&mut session, "1.5*2");
        session.commit();
        type_text(&mut session, "2*");
        assert!(session.insert_answer());
        assert_eq!(session.buffer().text(), "2*3");
        assert_eq!(session.result().display(), "6");
    }

    #[test]
    fn test_keypad_pi() {
        let (_, mut session) = session();
        session.press_key("cos").unwrap();
        session.move_left();
        session.press_key("π").unwrap();
        assert_eq!(session.buffer().text(), "cos(pi)");
        assert_eq!(session.result().display(), "-1");
        assert!(matches!(session.press_key("nope"), Err(SessionError::UnknownKey(_))));
    }

    #[test]
    fn test_state_survives_restart() {
        let (store, mut session) = session();
        type_text(&mut session, "7*6");
        session.commit();
        session.save_to_slot(Slot::D).unwrap();
        drop(session);

        let restored = Session::restore(CalculatorRepository::new(store));
        assert_eq!(restored.answer(), "42");
        assert_eq!(restored.memory().get(Slot::D), "42");
        assert_eq!(restored.history().len(), 1);
        assert!(restored.buffer().is_empty());
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let (store, mut session) = session();
        store.failing.store(true, Ordering::SeqCst);

        type_text(&mut session, "4+4");
        session.commit();
        session.save_to_slot(Slot::A).unwrap();
        assert_eq!(session.answer(), "8");
        assert_eq!(session.memory().get(Slot::A), "8");
        assert_eq!(store.get("memory").unwrap(), None);

        // The next successful write carries the whole in-memory set.
        store.failing.store(false, Ordering::SeqCst);
        type_text(&mut session, "1+1");
        session.commit();
        session.save_to_slot(Slot::B).unwrap();

        let restored = Session::restore(CalculatorRepository::new(store));
        assert_eq!(restored.memory().get(Slot::A), "8");
        assert_eq!(restored.memory().get(Slot::B), "2");
        assert_eq!(restored.history().len(), 2);
    }

    #[test]
    fn test_corrupt_store_falls_back_to_defaults() {
        let store = Arc::new(InMemoryStore::new());
        store.set("memory", "[[").unwrap();
        store.set("answer", "12").unwrap();

        let session = Session::restore(CalculatorRepository::new(store));
        assert!(!session.has_any_saved());
        assert_eq!(session.answer(), "12");
    }

    #[test]
    fn test_seed_applied_once() {
        let (_, mut session) = session();
        type_text(&mut session, "2^10");
        session.commit();

        session.recall(0).unwrap();
        assert!(session.apply_pending_seed());
        assert_eq!(session.buffer().text(), "2^10");
        assert_eq!(session.buffer().cursor(), 4);
        assert_eq!(session.result().display(), "1024");

        session.backspace();
        session.backspace();
        assert!(!session.apply_pending_seed());
        assert_eq!(session.buffer().text(), "2^");
    }

    #[test]
    fn test_seed_shows_handed_over_result() {
        let (_, mut session) = session();
        session.offer_seed(Seed {
            expression: "3*(4+5".to_string(),
            result: String::new(),
        });
        session.apply_pending_seed();
        assert_eq!(session.result(), &Evaluation::Empty);

        session.insert(")");
        assert_eq!(session.result().display(), "27");
    }

    #[test]
    fn test_recall_out_of_range() {
        let (_, mut session) = session();
        assert_eq!(session.recall(3), Err(SessionError::NoSuchEntry(4)));
        assert!(!session.apply_pending_seed());
    }
}
