//! Per-run user cache.

use std::collections::HashMap;
use std::sync::Arc;

use crate::export::model::User;

/// Users resolved during one export, keyed by user id.
///
/// Entries live for the whole run and are never invalidated.
#[derive(Debug, Default)]
pub struct UserCache {
    users: HashMap<String, Arc<User>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to a cached user.
    pub fn get(&self, user_id: &str) -> Option<Arc<User>> {
        self.users.get(user_id).cloned()
    }

    /// Cache a user and return the shared handle.
    pub fn insert(&mut self, user: User) -> Arc<User> {
        let user = Arc::new(user);
        self.users.insert(user.id.clone(), Arc::clone(&user));
        user
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
