// Services module - Card vault logic

pub mod challenge;
pub mod encryption;
pub mod gate;
pub mod persistence;
pub mod repository;
