//! A single election: the phase state machine behind a lock, plus its
//! journal of notifications.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    api::election::{ElectionDescription, ElectionSummary},
    candidate::{Candidate, CandidateId},
    notification::{Event, Notification, Notifier},
    principal::Principal,
    registry::ElectionId,
    voter::VoterRecord,
};

pub use election_core::ElectionCore;
pub use phase::ElectionPhase;
pub use windows::{TimeWindows, Window};

mod election_core;
mod phase;
mod windows;

/// A shared handle to one election.
///
/// All mutations are serialised by a per-election write lock and either
/// apply completely (state change, journal entry, notification) or not at
/// all. Reads take the read lock and always see a fully applied state.
#[derive(Debug)]
pub struct Election {
    id: ElectionId,
    state: RwLock<ElectionState>,
    notifier: Notifier,
}

#[derive(Debug)]
struct ElectionState {
    core: ElectionCore,
    journal: Vec<Notification>,
}

impl ElectionState {
    fn record(&mut self, event: Event, notifier: &Notifier) {
        let notification = Notification {
            election_id: self.core.id(),
            sequence: self.journal.len() as u64 + 1,
            event,
        };
        self.journal.push(notification.clone());
        notifier.publish(notification);
    }
}

impl Election {
    /// Wrap a freshly built election, recording its creation.
    pub(crate) fn new(core: ElectionCore, notifier: Notifier) -> Self {
        let id = core.id();
        let created = Event::ElectionCreated {
            admin: core.admin().clone(),
            title: core.title().to_string(),
        };
        let mut state = ElectionState {
            core,
            journal: Vec::new(),
        };
        state.record(created, &notifier);
        Self {
            id,
            state: RwLock::new(state),
            notifier,
        }
    }

    /// This election's ID, fixed at creation.
    pub fn id(&self) -> ElectionId {
        self.id
    }

    /// Add a candidate with a zero tally. Admin only, while the election is
    /// `Created`. Returns the candidate with its newly assigned ID.
    pub fn add_candidate(&self, caller: &Principal, name: &str) -> Result<Candidate> {
        let mut state = self.write();
        let (candidate, event) = state.core.add_candidate(caller, name)?;
        state.record(event, &self.notifier);
        Ok(candidate)
    }

    /// Open registration. Admin only, from `Created`.
    pub fn start_registration(&self, caller: &Principal) -> Result<()> {
        let mut state = self.write();
        let events = state.core.start_registration(caller)?;
        self.record_all(&mut state, events);
        Ok(())
    }

    /// Open voting. Admin only, from `Registration`, and only once there is
    /// at least one candidate.
    pub fn start_voting(&self, caller: &Principal) -> Result<()> {
        let mut state = self.write();
        let events = state.core.start_voting(caller)?;
        self.record_all(&mut state, events);
        Ok(())
    }

    /// End the election, freezing its tallies. Admin only, from `Voting`.
    pub fn end(&self, caller: &Principal) -> Result<()> {
        let mut state = self.write();
        let events = state.core.end(caller)?;
        self.record_all(&mut state, events);
        Ok(())
    }

    /// Register `caller` as a participant, if `now` is inside the registration
    /// window.
    pub fn register_voter(&self, caller: &Principal, now: DateTime<Utc>) -> Result<()> {
        let mut state = self.write();
        let event = state.core.register_voter(caller, now)?;
        state.record(event, &self.notifier);
        Ok(())
    }

    /// Cast `caller`'s single ballot for `candidate_id`, if `now` is inside the
    /// voting window. The tally and the voter's flag change together or not
    /// at all.
    pub fn vote(
        &self,
        caller: &Principal,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.write();
        let event = state.core.vote(caller, candidate_id, now)?;
        state.record(event, &self.notifier);
        Ok(())
    }

    /// The current phase.
    pub fn phase(&self) -> ElectionPhase {
        self.read().core.phase()
    }

    /// Every candidate, ordered by ascending ID.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.read().core.candidates().all()
    }

    /// The candidate with `id`, or `InvalidCandidate`.
    pub fn candidate(&self, id: CandidateId) -> Result<Candidate> {
        self.read().core.candidates().get(id).cloned()
    }

    /// The registration and voting windows.
    pub fn windows(&self) -> TimeWindows {
        self.read().core.windows()
    }

    /// What this election knows about `voter`. Strangers are unregistered.
    pub fn voter(&self, voter: &Principal) -> VoterRecord {
        self.read().core.voters().record(voter)
    }

    /// Journal entries with a sequence number greater than `since`.
    pub fn journal(&self, since: u64) -> Vec<Notification> {
        let state = self.read();
        let skip = usize::try_from(since).unwrap_or(usize::MAX);
        state.journal.iter().skip(skip).cloned().collect()
    }

    /// A consistent snapshot of the whole election.
    pub fn describe(&self) -> ElectionDescription {
        let state = self.read();
        let core = &state.core;
        ElectionDescription {
            id: core.id(),
            admin: core.admin().clone(),
            title: core.title().to_string(),
            description: core.description().to_string(),
            phase: core.phase(),
            windows: core.windows(),
            candidates: core.candidates().all(),
            registered_voters: core.voters().registered_count() as u64,
            votes_cast: core.candidates().total_votes(),
        }
    }

    /// The listing entry for this election.
    pub fn summarize(&self) -> ElectionSummary {
        let state = self.read();
        ElectionSummary {
            id: state.core.id(),
            title: state.core.title().to_string(),
            phase: state.core.phase(),
        }
    }

    fn record_all(&self, state: &mut ElectionState, events: Vec<Event>) {
        for event in events {
            state.record(event, &self.notifier);
        }
    }

    // A panic can only happen before an operation writes anything, so a
    // poisoned lock still guards a consistent election.
    fn read(&self) -> RwLockReadGuard<'_, ElectionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ElectionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Duration;

    use super::*;
    use crate::error::Error;
    use crate::model::clock::at;

    fn admin() -> Principal {
        Principal::admin()
    }

    fn election(notifier: Notifier) -> Election {
        let windows =
            TimeWindows::starting_at(at(0), Duration::seconds(100), Duration::seconds(200))
                .unwrap();
        let core = ElectionCore::new(3, admin(), "Board", "Annual board", windows).unwrap();
        Election::new(core, notifier)
    }

    #[test]
    fn journal_records_every_success_in_order() {
        let notifier = Notifier::new(16);
        let mut rx = notifier.subscribe();
        let election = election(notifier);
        let v = Principal::voter("v");

        election.add_candidate(&admin(), "Alice").unwrap();
        assert!(election.add_candidate(&admin(), "").is_err());
        election.start_registration(&admin()).unwrap();
        election.register_voter(&v, at(50)).unwrap();
        election.start_voting(&admin()).unwrap();
        election.vote(&v, 1, at(150)).unwrap();
        election.end(&admin()).unwrap();

        let journal = election.journal(0);
        let sequences: Vec<_> = journal.iter().map(|n| n.sequence).collect();
        assert_eq!(sequences, (1..=8).collect::<Vec<_>>());
        assert!(journal.iter().all(|n| n.election_id == 3));
        assert!(matches!(journal[0].event, Event::ElectionCreated { .. }));
        assert_eq!(
            journal[1].event,
            Event::CandidateAdded {
                candidate_id: 1,
                name: "Alice".to_string()
            }
        );
        assert_eq!(journal[7].event, Event::ElectionEnded { total_votes: 1 });

        // Live subscribers see the same stream, in the same order.
        for expected in &journal {
            assert_eq!(&rx.try_recv().unwrap(), expected);
        }

        let tail = election.journal(6);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 7);
        assert!(election.journal(8).is_empty());
        assert!(election.journal(u64::MAX).is_empty());
    }

    #[test]
    fn failures_are_not_journaled() {
        let election = election(Notifier::default());
        let intruder = Principal::voter("mallory");
        assert!(matches!(
            election.start_registration(&intruder),
            Err(Error::AccessDenied(_))
        ));
        assert!(matches!(
            election.register_voter(&intruder, at(10)),
            Err(Error::InvalidPhase { .. })
        ));
        assert_eq!(election.journal(0).len(), 1);
        assert_eq!(election.phase(), ElectionPhase::Created);
    }

    #[test]
    fn describe_is_a_snapshot() {
        let election = election(Notifier::default());
        election.add_candidate(&admin(), "Alice").unwrap();
        election.add_candidate(&admin(), "Bob").unwrap();
        let description = election.describe();
        assert_eq!(description.id, 3);
        assert_eq!(description.admin, admin());
        assert_eq!(description.phase, ElectionPhase::Created);
        assert_eq!(description.candidates.len(), 2);
        assert_eq!(description.windows.voting.end, at(300));
        assert_eq!(election.candidate(2).unwrap().name, "Bob");
        assert!(matches!(election.candidate(3), Err(Error::InvalidCandidate(3))));
    }

    #[test]
    fn concurrent_voters_are_all_counted() {
        let election = Arc::new(election(Notifier::default()));
        election.add_candidate(&admin(), "Alice").unwrap();
        election.add_candidate(&admin(), "Bob").unwrap();
        election.start_registration(&admin()).unwrap();
        let voters: Vec<_> = (0..64)
            .map(|i| Principal::voter(&format!("voter{i}")))
            .collect();
        for voter in &voters {
            election.register_voter(voter, at(1)).unwrap();
        }
        election.start_voting(&admin()).unwrap();

        // Every voter tries twice from two threads; exactly one attempt wins.
        let handles: Vec<_> = voters
            .iter()
            .enumerate()
            .flat_map(|(i, voter)| {
                (0..2).map(move |_| (i, voter.clone()))
            })
            .map(|(i, voter)| {
                let election = Arc::clone(&election);
                thread::spawn(move || {
                    let candidate = (i % 2) as CandidateId + 1;
                    election.vote(&voter, candidate, at(150)).is_ok()
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, voters.len());
        let candidates = election.candidates();
        assert_eq!(candidates[0].vote_count, 32);
        assert_eq!(candidates[1].vote_count, 32);
        assert!(voters.iter().all(|v| election.voter(v).has_voted));
    }
}
