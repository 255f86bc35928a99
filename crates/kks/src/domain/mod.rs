//! Pure domain types: sessions, clients, edit targets, and errors.

pub mod errors;
pub mod model;
pub mod target;
