use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A closed interval of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Both bounds are inclusive.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.end
    }
}

/// When registration and voting are open. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindows {
    pub registration: Window,
    pub voting: Window,
}

impl TimeWindows {
    /// Lay out back-to-back registration and voting windows starting at `start`.
    pub fn starting_at(
        start: DateTime<Utc>,
        registration_duration: Duration,
        voting_duration: Duration,
    ) -> Result<Self> {
        if registration_duration <= Duration::zero() {
            return Err(Error::InvalidInput(
                "registration duration must be positive".to_string(),
            ));
        }
        if voting_duration <= Duration::zero() {
            return Err(Error::InvalidInput(
                "voting duration must be positive".to_string(),
            ));
        }

        let registration_end = start
            .checked_add_signed(registration_duration)
            .ok_or_else(|| Error::InvalidInput("registration window overflows".to_string()))?;
        let voting_end = registration_end
            .checked_add_signed(voting_duration)
            .ok_or_else(|| Error::InvalidInput("voting window overflows".to_string()))?;

        Ok(Self {
            registration: Window {
                start,
                end: registration_end,
            },
            voting: Window {
                start: registration_end,
                end: voting_end,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::clock::at;

    #[test]
    fn windows_are_back_to_back() {
        let windows =
            TimeWindows::starting_at(at(0), Duration::seconds(100), Duration::seconds(200))
                .unwrap();
        assert_eq!(windows.registration, Window { start: at(0), end: at(100) });
        assert_eq!(windows.voting, Window { start: at(100), end: at(300) });
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = Window { start: at(100), end: at(300) };
        assert!(!window.contains(at(99)));
        assert!(window.contains(at(100)));
        assert!(window.contains(at(300)));
        assert!(!window.contains(at(301)));
    }

    #[test]
    fn durations_must_be_positive() {
        for (registration, voting) in [(0, 10), (10, 0), (-5, 10), (10, -5)] {
            let result = TimeWindows::starting_at(
                at(0),
                Duration::seconds(registration),
                Duration::seconds(voting),
            );
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn overflow_is_invalid_input() {
        let result = TimeWindows::starting_at(
            DateTime::<Utc>::MAX_UTC - Duration::seconds(10),
            Duration::seconds(5),
            Duration::seconds(60),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
