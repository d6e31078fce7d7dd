use chrono::Duration;
use serde::{Deserialize, Serialize};

/// A request to create an election.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSpec {
    /// Election title.
    pub title: String,
    /// Election description.
    pub description: String,
    /// Length of the registration window, in seconds.
    pub registration_duration: i64,
    /// Length of the voting window, in seconds.
    pub voting_duration: i64,
}

impl ElectionSpec {
    pub fn registration_duration(&self) -> Duration {
        seconds(self.registration_duration)
    }

    pub fn voting_duration(&self) -> Duration {
        seconds(self.voting_duration)
    }
}

/// Clamped to the range `Duration` can hold; window arithmetic rejects
/// anything that large later on.
fn seconds(seconds: i64) -> Duration {
    Duration::milliseconds(seconds.saturating_mul(1000).max(-i64::MAX))
}

/// A request to add a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl ElectionSpec {
        /// Registration for 100 seconds, then voting for 200.
        pub fn example() -> Self {
            Self {
                title: "Committee 2026".to_string(),
                description: "Election of the society committee".to_string(),
                registration_duration: 100,
                voting_duration: 200,
            }
        }
    }

    impl CandidateSpec {
        pub fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_in_seconds() {
        let spec = ElectionSpec::example();
        assert_eq!(spec.registration_duration(), Duration::seconds(100));
        assert_eq!(spec.voting_duration(), Duration::seconds(200));
    }

    #[test]
    fn huge_durations_do_not_panic() {
        let spec = ElectionSpec {
            registration_duration: i64::MAX,
            voting_duration: i64::MIN,
            ..ElectionSpec::example()
        };
        assert!(spec.registration_duration() > Duration::zero());
        assert!(spec.voting_duration() < Duration::zero());
    }
}
