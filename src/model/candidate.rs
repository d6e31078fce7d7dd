use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Candidate IDs are assigned from 1 in order of addition.
pub type CandidateId = u32;

/// A candidate and its running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

/// The ordered candidates of one election.
///
/// Candidates are stored at index `id - 1`, so IDs stay dense and are never
/// reassigned.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate with a zero tally.
    pub fn add(&mut self, name: &str) -> Result<&Candidate> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "candidate name must not be empty".to_string(),
            ));
        }
        let id = CandidateId::try_from(self.candidates.len() + 1)
            .map_err(|_| Error::InvalidInput("too many candidates".to_string()))?;
        self.candidates.push(Candidate {
            id,
            name: name.to_string(),
            vote_count: 0,
        });
        Ok(&self.candidates[self.candidates.len() - 1])
    }

    /// Number of candidates, which is also the highest ID assigned.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Whether a candidate with `id` exists.
    pub fn contains(&self, id: CandidateId) -> bool {
        self.index_of(id).is_some()
    }

    /// The candidate with `id`, or `InvalidCandidate`.
    pub fn get(&self, id: CandidateId) -> Result<&Candidate> {
        self.index_of(id)
            .map(|index| &self.candidates[index])
            .ok_or(Error::InvalidCandidate(id))
    }

    /// All candidates, ordered by ascending ID.
    pub fn all(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }

    /// Add one vote to the given candidate's tally.
    pub fn record_vote(&mut self, id: CandidateId) -> Result<()> {
        let index = self.index_of(id).ok_or(Error::InvalidCandidate(id))?;
        let candidate = &mut self.candidates[index];
        candidate.vote_count = candidate
            .vote_count
            .checked_add(1)
            .ok_or_else(|| Error::InvalidInput(format!("tally overflow for candidate {id}")))?;
        Ok(())
    }

    /// Sum of all tallies, which equals the number of ballots cast.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    fn index_of(&self, id: CandidateId) -> Option<usize> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        (index < self.candidates.len()).then_some(index)
    }
}
