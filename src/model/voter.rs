use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::principal::Principal;

/// A participant's standing in one election. Both flags only ever go from
/// `false` to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub is_registered: bool,
    pub has_voted: bool,
}

/// Registration and voting status of every participant in one election.
#[derive(Debug, Clone, Default)]
pub struct VoterRegistry {
    records: HashMap<Principal, VoterRecord>,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `voter`; participants never seen before are unregistered.
    pub fn record(&self, voter: &Principal) -> VoterRecord {
        self.records.get(voter).copied().unwrap_or_default()
    }

    pub fn register(&mut self, voter: &Principal) -> Result<()> {
        let record = self.records.entry(voter.clone()).or_default();
        if record.is_registered {
            return Err(Error::AlreadyRegistered(voter.clone()));
        }
        record.is_registered = true;
        Ok(())
    }

    /// Check that `voter` may cast a ballot, without changing anything.
    pub fn check_can_vote(&self, voter: &Principal) -> Result<()> {
        let record = self.record(voter);
        if !record.is_registered {
            return Err(Error::NotRegistered(voter.clone()));
        }
        if record.has_voted {
            return Err(Error::AlreadyVoted(voter.clone()));
        }
        Ok(())
    }

    pub fn mark_voted(&mut self, voter: &Principal) -> Result<()> {
        self.check_can_vote(voter)?;
        // Present, as `check_can_vote` requires registration.
        if let Some(record) = self.records.get_mut(voter) {
            record.has_voted = true;
        }
        Ok(())
    }

    pub fn registered_count(&self) -> usize {
        self.records.values().filter(|r| r.is_registered).count()
    }

    pub fn voted_count(&self) -> usize {
        self.records.values().filter(|r| r.has_voted).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_voter_is_unregistered() {
        let registry = VoterRegistry::new();
        assert_eq!(
            registry.record(&Principal::voter("v")),
            VoterRecord::default()
        );
    }

    #[test]
    fn register_once() {
        let mut registry = VoterRegistry::new();
        let voter = Principal::voter("v");
        registry.register(&voter).unwrap();
        assert!(matches!(
            registry.register(&voter),
            Err(Error::AlreadyRegistered(_))
        ));
        assert_eq!(
            registry.record(&voter),
            VoterRecord {
                is_registered: true,
                has_voted: false
            }
        );
        assert_eq!(registry.registered_count(), 1);
    }

    #[test]
    fn vote_requires_registration_and_happens_once() {
        let mut registry = VoterRegistry::new();
        let voter = Principal::voter("v");
        assert!(matches!(
            registry.mark_voted(&voter),
            Err(Error::NotRegistered(_))
        ));

        registry.register(&voter).unwrap();
        registry.mark_voted(&voter).unwrap();
        assert!(matches!(
            registry.mark_voted(&voter),
            Err(Error::AlreadyVoted(_))
        ));
        assert!(registry.record(&voter).has_voted);
        assert_eq!(registry.voted_count(), 1);
    }
}
