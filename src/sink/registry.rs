//! In-memory recipient registry.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Audience, BarTarget, RecipientId, RecipientRegistry};

#[derive(Debug, Clone)]
struct Entry {
    id: RecipientId,
    name: String,
    online: bool,
}

/// Registry backed by a list of known recipients, in join order.
///
/// Suitable for hosts without their own player registry and for tests.
#[derive(Debug, Default)]
pub struct LocalRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an online recipient and returns its id.
    pub fn join(&self, name: impl Into<String>) -> RecipientId {
        let id = RecipientId::new();
        self.entries().push(Entry {
            id,
            name: name.into(),
            online: true,
        });
        id
    }

    /// Marks a known recipient online or offline. Unknown ids are ignored.
    pub fn set_online(&self, recipient: &RecipientId, online: bool) {
        if let Some(entry) = self.entries().iter_mut().find(|e| e.id == *recipient) {
            entry.online = online;
        }
    }

}

impl RecipientRegistry for LocalRegistry {
    fn is_online(&self, recipient: &RecipientId) -> bool {
        self.entries()
            .iter()
            .any(|e| e.id == *recipient && e.online)
    }

    fn list_viewers(&self, bar: &BarTarget) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|e| e.online)
            .filter(|e| match bar.audience {
                Audience::Single(recipient) => e.id == recipient,
                Audience::Broadcast => true,
            })
            .map(|e| e.name.clone())
            .collect()
    }
}
