//! Application layer: session registry, launcher, dispatcher, and the edit flow.

pub mod edit;
pub mod editor;
pub mod launch;
pub mod send;
pub mod session;
