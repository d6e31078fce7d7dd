use log::debug;
use rocket::tokio::sync::broadcast;
use serde::{Deserialize, Serialize};

use crate::model::{
    candidate::CandidateId, election::ElectionPhase, principal::Principal, registry::ElectionId,
};

/// Buffer size of the live notification channel, if not configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Something that happened to an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ElectionCreated {
        admin: Principal,
        title: String,
    },
    CandidateAdded {
        candidate_id: CandidateId,
        name: String,
    },
    PhaseChanged {
        from: ElectionPhase,
        to: ElectionPhase,
    },
    VoterRegistered {
        voter: Principal,
    },
    VoteCast {
        voter: Principal,
        candidate_id: CandidateId,
    },
    ElectionEnded {
        total_votes: u64,
    },
}

/// An [`Event`] stamped with its election and its position in that
/// election's journal. Sequence numbers start at 1 and have no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub election_id: ElectionId,
    pub sequence: u64,
    pub event: Event,
}

/// Fans notifications out to live subscribers.
///
/// Delivery is best-effort: a subscriber that falls behind the channel
/// capacity misses notifications and must catch up from the election's
/// journal.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn publish(&self, notification: Notification) {
        let election_id = notification.election_id;
        let sequence = notification.sequence;
        match self.sender.send(notification) {
            Ok(receivers) => {
                debug!("Election {election_id} #{sequence} sent to {receivers} subscriber(s)")
            }
            // No subscribers right now; the journal still has it.
            Err(_) => debug!("Election {election_id} #{sequence} had no subscribers"),
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
