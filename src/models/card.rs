use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bank::Bank;

/// A single stored payment card.
///
/// `id` is only unique at assignment time (see [`IdPolicy`]).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: u64,
    pub bank: String,
    pub name: String,
    pub pin: String,
    pub cvc: String,
}

impl CardRecord {
    pub fn bank_kind(&self) -> Bank {
        Bank::from_name(&self.bank)
    }

    /// Overwrites every field except `id` with the submitted values.
    pub fn apply(&mut self, input: CardInput) {
        self.bank = input.bank.to_lowercase();
        self.name = input.name;
        self.pin = input.pin;
        self.cvc = input.cvc;
    }
}

impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("id", &self.id)
            .field("bank", &self.bank)
            .field("name", &self.name)
            .field("pin", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

/// Field values submitted from the add/edit form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    pub bank: String,
    pub name: String,
    pub pin: String,
    pub cvc: String,
}

impl CardInput {
    pub fn new(
        bank: impl Into<String>,
        name: impl Into<String>,
        pin: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            bank: bank.into(),
            name: name.into(),
            pin: pin.into(),
            cvc: cvc.into(),
        }
    }

    pub fn into_record(self, id: u64) -> CardRecord {
        CardRecord {
            id,
            bank: self.bank.to_lowercase(),
            name: self.name,
            pin: self.pin,
            cvc: self.cvc,
        }
    }
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("bank", &self.bank)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a new record's `id` is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// Length of the collection before insertion. Can repeat after a removal.
    #[default]
    Length,
    /// One past the largest id currently present.
    Monotonic,
}

impl IdPolicy {
    pub fn next_id(self, cards: &[CardRecord]) -> u64 {
        match self {
            IdPolicy::Length => cards.len() as u64,
            IdPolicy::Monotonic => cards.iter().map(|c| c.id + 1).max().unwrap_or(0),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown id policy: {0} (expected \"length\" or \"monotonic\")")]
pub struct UnknownIdPolicy(String);

impl FromStr for IdPolicy {
    type Err = UnknownIdPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "length" => Ok(IdPolicy::Length),
            "monotonic" => Ok(IdPolicy::Monotonic),
            other => Err(UnknownIdPolicy(other.to_string())),
        }
    }
}

/// Serializes the whole collection into the blob stored under the item key.
pub fn serialize_cards(cards: &[CardRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(cards)
}

/// Parses a stored blob. A JSON `null` is read as an empty collection.
pub fn deserialize_cards(blob: &str) -> Result<Vec<CardRecord>, serde_json::Error> {
    let cards: Option<Vec<CardRecord>> = serde_json::from_str(blob)?;
    Ok(cards.unwrap_or_default())
}
