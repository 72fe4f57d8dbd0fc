use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::wizard::controller::WizardController;

/// In-memory wizard session store. Controllers are mutated only inside
/// short critical sections; handlers run network I/O outside the lock
/// and re-enter through generation-guarded commands, so a response for
/// a dead or superseded session is simply dropped on arrival.
pub struct WizardSessions {
    inner: RwLock<HashMap<Uuid, WizardController>>,
}

impl WizardSessions {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, controller: WizardController) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().unwrap().insert(id, controller);
        id
    }

    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&WizardController) -> R) -> Option<R> {
        self.inner.read().unwrap().get(&id).map(f)
    }

    pub fn with_mut<R>(&self, id: Uuid, f: impl FnOnce(&mut WizardController) -> R) -> Option<R> {
        self.inner.write().unwrap().get_mut(&id).map(f)
    }

    pub fn remove(&self, id: Uuid) -> Option<WizardController> {
        self.inner.write().unwrap().remove(&id)
    }
}

impl Default for WizardSessions {
    fn default() -> Self {
        Self::new()
    }
}
