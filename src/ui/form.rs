use std::fmt;

use crate::models::{CardInput, CardRecord};

/// State of the add/edit card form.
///
/// Submitting hands back the entered values, clears every field and hides
/// the form.
#[derive(Default)]
pub struct CardForm {
    pub bank: String,
    pub name: String,
    pub pin: String,
    pub cvc: String,
    visible: bool,
    editing: Option<u64>,
}

impl CardForm {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Id of the record being edited, `None` when adding.
    pub fn editing(&self) -> Option<u64> {
        self.editing
    }

    pub fn open(&mut self) {
        self.clear();
        self.visible = true;
    }

    /// Opens the form pre-filled with an existing record.
    pub fn open_for(&mut self, card: &CardRecord) {
        self.bank = card.bank.clone();
        self.name = card.name.clone();
        self.pin = card.pin.clone();
        self.cvc = card.cvc.clone();
        self.editing = Some(card.id);
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.clear();
        self.visible = false;
    }

    /// Takes the field values and resets the form.
    pub fn submit(&mut self) -> (Option<u64>, CardInput) {
        let input = CardInput {
            bank: std::mem::take(&mut self.bank),
            name: std::mem::take(&mut self.name),
            pin: std::mem::take(&mut self.pin),
            cvc: std::mem::take(&mut self.cvc),
        };
        let editing = self.editing.take();
        self.visible = false;
        (editing, input)
    }

    fn clear(&mut self) {
        self.bank.clear();
        self.name.clear();
        self.pin.clear();
        self.cvc.clear();
        self.editing = None;
    }
}

impl fmt::Debug for CardForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardForm")
            .field("bank", &self.bank)
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("editing", &self.editing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_resets_fields_and_hides() {
        let mut form = CardForm::default();
        form.open();
        form.bank = "Amex".to_string();
        form.name = "Alice".to_string();
        form.pin = "1234".to_string();
        form.cvc = "123".to_string();

        let (editing, input) = form.submit();

        assert_eq!(editing, None);
        assert_eq!(input, CardInput::new("Amex", "Alice", "1234", "123"));
        assert!(!form.is_visible());
        assert!(form.bank.is_empty() && form.name.is_empty());
        assert!(form.pin.is_empty() && form.cvc.is_empty());
    }

    #[test]
    fn test_edit_prefills_and_remembers_id() {
        let card = CardInput::new("hsbc", "Bob", "5678", "456").into_record(4);
        let mut form = CardForm::default();
        form.open_for(&card);

        assert!(form.is_visible());
        assert_eq!(form.editing(), Some(4));
        assert_eq!(form.name, "Bob");

        let (editing, _) = form.submit();
        assert_eq!(editing, Some(4));
        assert_eq!(form.editing(), None);
    }

    #[test]
    fn test_open_after_edit_starts_blank() {
        let card = CardInput::new("hsbc", "Bob", "5678", "456").into_record(4);
        let mut form = CardForm::default();
        form.open_for(&card);
        form.close();
        form.open();

        assert_eq!(form.editing(), None);
        assert!(form.name.is_empty());
    }
}
