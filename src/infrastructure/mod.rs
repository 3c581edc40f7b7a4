//! In-memory state, configuration and reference data

pub mod catalog;
pub mod config;
pub mod entities;
pub mod fixtures;
pub mod memory;
pub mod repositories;
pub mod traits;
