use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{
    candidate::{Candidate, CandidateId, CandidateRegistry},
    notification::Event,
    principal::Principal,
    registry::ElectionId,
    voter::VoterRegistry,
};

use super::{phase::ElectionPhase, windows::TimeWindows};

/// The election state machine, without any synchronisation.
///
/// Every operation checks, in order: admin rights (admin operations only),
/// phase, time window, then the operation's own business rules. Nothing is
/// written until every check has passed, so a rejected operation leaves the
/// election exactly as it was. Successful operations return the events they
/// caused.
#[derive(Debug, Clone)]
pub struct ElectionCore {
    id: ElectionId,
    admin: Principal,
    title: String,
    description: String,
    phase: ElectionPhase,
    windows: TimeWindows,
    candidates: CandidateRegistry,
    voters: VoterRegistry,
}

impl ElectionCore {
    pub fn new(
        id: ElectionId,
        admin: Principal,
        title: &str,
        description: &str,
        windows: TimeWindows,
    ) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }
        if description.trim().is_empty() {
            return Err(Error::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            admin,
            title: title.to_string(),
            description: description.to_string(),
            phase: ElectionPhase::Created,
            windows,
            candidates: CandidateRegistry::new(),
            voters: VoterRegistry::new(),
        })
    }

    pub fn id(&self) -> ElectionId {
        self.id
    }

    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn phase(&self) -> ElectionPhase {
        self.phase
    }

    pub fn windows(&self) -> TimeWindows {
        self.windows
    }

    pub fn candidates(&self) -> &CandidateRegistry {
        &self.candidates
    }

    pub fn voters(&self) -> &VoterRegistry {
        &self.voters
    }

    pub fn add_candidate(&mut self, caller: &Principal, name: &str) -> Result<(Candidate, Event)> {
        self.ensure_admin(caller)?;
        self.ensure_phase(ElectionPhase::Created)?;
        let candidate = self.candidates.add(name)?.clone();
        let event = Event::CandidateAdded {
            candidate_id: candidate.id,
            name: candidate.name.clone(),
        };
        Ok((candidate, event))
    }

    pub fn start_registration(&mut self, caller: &Principal) -> Result<Vec<Event>> {
        self.ensure_admin(caller)?;
        self.ensure_phase(ElectionPhase::Created)?;
        Ok(vec![self.advance()])
    }

    /// Open voting. The registration window is not consulted: the admin may
    /// close registration early.
    pub fn start_voting(&mut self, caller: &Principal) -> Result<Vec<Event>> {
        self.ensure_admin(caller)?;
        self.ensure_phase(ElectionPhase::Registration)?;
        if self.candidates.is_empty() {
            return Err(Error::NoCandidates(self.id));
        }
        Ok(vec![self.advance()])
    }

    /// Close the election for good. The voting window is not consulted.
    pub fn end(&mut self, caller: &Principal) -> Result<Vec<Event>> {
        self.ensure_admin(caller)?;
        self.ensure_phase(ElectionPhase::Voting)?;
        let changed = self.advance();
        Ok(vec![
            changed,
            Event::ElectionEnded {
                total_votes: self.candidates.total_votes(),
            },
        ])
    }

    pub fn register_voter(&mut self, caller: &Principal, now: DateTime<Utc>) -> Result<Event> {
        self.ensure_phase(ElectionPhase::Registration)?;
        if !self.windows.registration.contains(now) {
            return Err(Error::WindowClosed(format!(
                "registration for election {} is open from {} to {}",
                self.id, self.windows.registration.start, self.windows.registration.end
            )));
        }
        self.voters.register(caller)?;
        Ok(Event::VoterRegistered {
            voter: caller.clone(),
        })
    }

    pub fn vote(
        &mut self,
        caller: &Principal,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        self.ensure_phase(ElectionPhase::Voting)?;
        if !self.windows.voting.contains(now) {
            return Err(Error::WindowClosed(format!(
                "voting for election {} is open from {} to {}",
                self.id, self.windows.voting.start, self.windows.voting.end
            )));
        }
        self.voters.check_can_vote(caller)?;
        if !self.candidates.contains(candidate_id) {
            return Err(Error::InvalidCandidate(candidate_id));
        }

        // Tally first: if it fails, the voter has not been marked.
        self.candidates.record_vote(candidate_id)?;
        self.voters.mark_voted(caller)?;
        Ok(Event::VoteCast {
            voter: caller.clone(),
            candidate_id,
        })
    }

    fn ensure_admin(&self, caller: &Principal) -> Result<()> {
        if *caller != self.admin {
            return Err(Error::AccessDenied(format!(
                "{caller} is not the admin of election {}",
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_phase(&self, expected: ElectionPhase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::InvalidPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Move to the next phase. Callers have already checked the current one.
    fn advance(&mut self) -> Event {
        let from = self.phase;
        // No transition accepts `Ended`, so there is always a next phase.
        let to = from.next().unwrap_or(from);
        self.phase = to;
        Event::PhaseChanged { from, to }
    }
}
