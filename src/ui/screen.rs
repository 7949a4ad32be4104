use std::fmt;

use crate::models::{AuthorizationState, CardRecord};

pub const ACCESS_DENIED: &str = "Access denied";
pub const HEADERS: [&str; 3] = ["Bank", "CVC", "Pin"];

/// One rendered card line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub id: u64,
    pub icon: &'static str,
    pub name: String,
    pub cvc: String,
    pub pin: String,
}

impl From<&CardRecord> for CardRow {
    fn from(card: &CardRecord) -> Self {
        Self {
            id: card.id,
            icon: card.bank_kind().icon(),
            name: card.name.clone(),
            cvc: card.cvc.clone(),
            pin: card.pin.clone(),
        }
    }
}

/// What the card screen shows for a given authorization state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Challenge not resolved yet; nothing is shown.
    Pending,
    Denied,
    Cards(Vec<CardRow>),
}

impl Screen {
    /// Card data is only ever rendered for `Granted`.
    pub fn render(state: AuthorizationState, cards: &[CardRecord]) -> Self {
        match state {
            AuthorizationState::Unknown => Screen::Pending,
            AuthorizationState::Denied => Screen::Denied,
            AuthorizationState::Granted => Screen::Cards(cards.iter().map(CardRow::from).collect()),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Card details")?;
        match self {
            Screen::Pending => Ok(()),
            Screen::Denied => writeln!(f, "{}", ACCESS_DENIED),
            Screen::Cards(rows) => {
                writeln!(f, "{:<4} {:<32} {:<6} {:<6}", "#", HEADERS[0], HEADERS[1], HEADERS[2])?;
                for row in rows {
                    writeln!(
                        f,
                        "{:<4} {:<32} {:<6} {:<6}",
                        row.id,
                        format!("[{}] {}", row.icon, row.name),
                        row.cvc,
                        row.pin
                    )?;
                }
                Ok(())
            }
        }
    }
}
