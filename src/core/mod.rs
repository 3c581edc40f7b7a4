//! Arena business rules: the turn lifecycle and the response generator

pub mod error;
pub mod events;
pub mod generator;
pub mod random;
pub mod services;
pub mod traits;
