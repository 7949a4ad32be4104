// Models module - Card vault data types

pub mod authorization;
pub mod bank;
pub mod card;

pub use authorization::{AuthorizationState, LifecycleState};
pub use bank::Bank;
pub use card::{CardInput, CardRecord, IdPolicy};
