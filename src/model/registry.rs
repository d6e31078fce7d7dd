use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Duration, Utc};
use rocket::tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::model::{
    election::{Election, ElectionCore, TimeWindows},
    notification::{Notification, Notifier},
    principal::Principal,
};

/// Our election IDs are integers, allocated densely from 1.
pub type ElectionId = u32;

/// Every election this process knows about.
///
/// Elections are only ever appended; the election with ID `n` lives at
/// index `n - 1`. The lock covers ID allocation and insertion only, each
/// election synchronises its own state.
#[derive(Debug, Default)]
pub struct ElectionRegistry {
    elections: RwLock<Vec<Arc<Election>>>,
    notifier: Notifier,
}

impl ElectionRegistry {
    /// An empty registry whose elections publish through `notifier`.
    pub fn new(notifier: Notifier) -> Self {
        Self {
            elections: RwLock::new(Vec::new()),
            notifier,
        }
    }

    /// Create an election administered by `creator`, with registration
    /// opening at `now` and voting directly after it.
    pub fn create(
        &self,
        creator: &Principal,
        title: &str,
        description: &str,
        registration_duration: Duration,
        voting_duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<(ElectionId, Arc<Election>)> {
        let windows = TimeWindows::starting_at(now, registration_duration, voting_duration)?;

        let mut elections = self
            .elections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = ElectionId::try_from(elections.len() + 1)
            .map_err(|_| Error::InvalidInput("election IDs exhausted".to_string()))?;
        let core = ElectionCore::new(id, creator.clone(), title, description, windows)?;
        let election = Arc::new(Election::new(core, self.notifier.clone()));
        elections.push(Arc::clone(&election));
        Ok((id, election))
    }

    /// The election with `id`, or `NotFound`.
    pub fn get(&self, id: ElectionId) -> Result<Arc<Election>> {
        usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| self.read().get(index).cloned())
            .ok_or_else(|| Error::NotFound(format!("Election {id}")))
    }

    /// How many elections have been created. Also the highest ID in use.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// All elections, in creation order.
    pub fn all(&self) -> Vec<Arc<Election>> {
        self.read().clone()
    }

    /// Receive notifications from every election as they happen.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Election>>> {
        self.elections.read().unwrap_or_else(PoisonError::into_inner)
    }
}
