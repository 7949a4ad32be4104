use serde::{Deserialize, Serialize};

/// Icon shown for banks without a dedicated logo
pub const DEFAULT_ICON: &str = "images/default.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Amex,
    Natwest,
    Hsbc,
    Barclays,
    Virgin,
    FirstDirect,
    Other,
}

const ICONS: &[(Bank, &str)] = &[
    (Bank::Amex, "images/amex.png"),
    (Bank::Natwest, "images/natwest.png"),
    (Bank::Hsbc, "images/hsbc.png"),
    (Bank::Barclays, "images/barclays.png"),
    (Bank::Virgin, "images/virgin.png"),
    (Bank::FirstDirect, "images/firstdirect.png"),
    (Bank::Other, DEFAULT_ICON),
];

impl Bank {
    /// Matches the stored bank name case-insensitively; anything unknown is `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "amex" => Bank::Amex,
            "natwest" => Bank::Natwest,
            "hsbc" => Bank::Hsbc,
            "barclays" => Bank::Barclays,
            "virgin" => Bank::Virgin,
            "firstdirect" => Bank::FirstDirect,
            _ => Bank::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        ICONS
            .iter()
            .find(|(bank, _)| *bank == self)
            .map(|(_, icon)| *icon)
            .unwrap_or(DEFAULT_ICON)
    }
}
