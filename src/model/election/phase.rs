use std::fmt::{Display, Formatter};

use serde_repr::{Deserialize_repr, Serialize_repr};

/// States in the election lifecycle, in the only order they can occur.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum ElectionPhase {
    /// Being set up by its admin; candidates may be added.
    Created = 0,
    /// Participants may register.
    Registration = 1,
    /// Registered participants may vote.
    Voting = 2,
    /// Closed for good; tallies are final.
    Ended = 3,
}

impl ElectionPhase {
    /// The phase this one advances to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Registration),
            Self::Registration => Some(Self::Voting),
            Self::Voting => Some(Self::Ended),
            Self::Ended => None,
        }
    }
}

impl Display for ElectionPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Registration => "registration",
            Self::Voting => "voting",
            Self::Ended => "ended",
        };
        write!(f, "{name}")
    }
}
