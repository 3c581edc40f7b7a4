//! Process-wide in-memory tables

use crate::infrastructure::entities::{Chat, Message, Turn, User};
use di::inject;
use di::injectable;
use std::collections::HashMap;
use std::ops::Deref;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Tables {
    pub users: HashMap<Uuid, User>,
    pub chats: HashMap<Uuid, Chat>,
    pub turns: HashMap<Uuid, Turn>,
    pub messages: HashMap<Uuid, Vec<Message>>,
    /// Chat ids per user, in creation order.
    pub user_chats: HashMap<Uuid, Vec<Uuid>>,
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
}

#[injectable]
impl MemoryDatabase {
    #[inject]
    pub fn create() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

impl Deref for MemoryDatabase {
    type Target = RwLock<Tables>;

    fn deref(&self) -> &Self::Target {
        &self.tables
    }
}
