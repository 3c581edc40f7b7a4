//! Arena mock API - Library exports for testing
//!
//! (c) Softlandia 2025

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::core::generator::DualStreamGenerator;
use crate::core::random::ArenaRandom;
use crate::core::services::MyArenaService;
use crate::infrastructure::catalog::ReferenceData;
use crate::infrastructure::config::ArenaConfig;
use crate::infrastructure::memory::MemoryDatabase;
use crate::infrastructure::repositories::MemoryEntityStore;
use di::{Injectable, ServiceCollection};

/// Every service the API needs. Each provider built from this owns its own store.
pub fn services() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .add(ArenaConfig::singleton())
        .add(MemoryDatabase::singleton())
        .add(ArenaRandom::singleton())
        .add(ReferenceData::singleton())
        .add(MemoryEntityStore::scoped())
        .add(DualStreamGenerator::scoped())
        .add(MyArenaService::scoped());
    services
}
