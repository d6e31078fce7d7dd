use serde::{Deserialize, Serialize};

use crate::model::candidate::CandidateId;

/// A ballot the caller wishes to cast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BallotSpec {
    pub candidate_id: CandidateId,
}
