// UI module - Presentation layer view-model and render model

pub mod form;
pub mod screen;
pub mod session;

pub use form::CardForm;
pub use screen::{CardRow, Screen};
pub use session::CardSession;
