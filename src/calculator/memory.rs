//! Named memory slots A through L.

use crate::error::SessionError;
use std::collections::BTreeMap;
use std::fmt;

/// One of the twelve memory slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
}

impl Slot {
    pub const ALL: [Slot; 12] = [
        Slot::A,
        Slot::B,
        Slot::C,
        Slot::D,
        Slot::E,
        Slot::F,
        Slot::G,
        Slot::H,
        Slot::I,
        Slot::J,
        Slot::K,
        Slot::L,
    ];

    /// Parse a single slot letter, case-insensitively.
    pub fn parse(name: &str) -> Result<Self, SessionError> {
        let mut chars = name.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::ALL
                .into_iter()
                .find(|slot| slot.letter() == letter.to_ascii_uppercase())
                .ok_or_else(|| SessionError::UnknownSlot(name.to_string())),
            _ => Err(SessionError::UnknownSlot(name.to_string())),
        }
    }

    pub fn letter(self) -> char {
        (b'A' + self.index() as u8) as char
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Returns true if `value` is worth keeping in a slot.
///
/// Empty values, the default answer `"0"` and the error marker are not.
pub fn is_saveable(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && value != super::ERROR_DISPLAY
}

/// The full set of twelve slots. An empty string means unoccupied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBank {
    slots: [String; 12],
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` in `slot`, replacing whatever was there.
    pub fn save(&mut self, slot: Slot, value: &str) -> Result<(), SessionError> {
        if !is_saveable(value) {
            return Err(SessionError::NothingToSave);
        }

        self.slots[slot.index()] = value.to_string();
        Ok(())
    }

    /// Read a slot for insertion. The slot keeps its value.
    pub fn use_slot(&self, slot: Slot) -> Result<&str, SessionError> {
        let value = self.get(slot);
        if value.trim().is_empty() {
            return Err(SessionError::EmptySlot(slot));
        }
        Ok(value)
    }

    pub fn get(&self, slot: Slot) -> &str {
        &self.slots[slot.index()]
    }

    pub fn reset(&mut self) {
        self.slots = Default::default();
    }

    pub fn has_any_saved(&self) -> bool {
        self.slots.iter().any(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> {
        Slot::ALL.into_iter().map(|slot| (slot, self.get(slot)))
    }

    /// The persisted shape: exactly the keys `A`..`L`.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(slot, value)| (slot.to_string(), value.to_string()))
            .collect()
    }

    /// Rebuild a bank from its persisted shape.
    ///
    /// Missing letters stay empty and unknown keys are dropped, so the bank
    /// always has all twelve slots.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut bank = Self::new();
        for (key, value) in map {
            match Slot::parse(key) {
                Ok(slot) if key.len() == 1 && key.chars().all(|c| c.is_ascii_uppercase()) => {
                    bank.slots[slot.index()] = value.clone();
                }
                _ => tracing::debug!(key, "ignoring unknown memory key"),
            }
        }
        bank
    }
}
