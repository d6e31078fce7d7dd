use serde::{Deserialize, Serialize};

use crate::model::{
    candidate::Candidate,
    election::{ElectionPhase, TimeWindows},
    principal::Principal,
    registry::ElectionId,
};

/// An API-friendly snapshot of a whole election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    /// Election unique ID.
    pub id: ElectionId,
    /// The only principal allowed to administer the election.
    pub admin: Principal,
    /// Election title.
    pub title: String,
    /// Election description.
    pub description: String,
    /// Current phase.
    pub phase: ElectionPhase,
    /// Registration and voting windows.
    pub windows: TimeWindows,
    /// Candidates with their tallies, ordered by ID.
    pub candidates: Vec<Candidate>,
    /// Number of registered participants.
    pub registered_voters: u64,
    /// Number of ballots cast so far.
    pub votes_cast: u64,
}

/// The top-level details of an election, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub id: ElectionId,
    pub title: String,
    pub phase: ElectionPhase,
}
