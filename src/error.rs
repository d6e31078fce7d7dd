use jsonwebtoken::errors::Error as JwtError;
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::{
    candidate::CandidateId, election::ElectionPhase, principal::Principal, registry::ElectionId,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an operation was rejected. None of them are transient, and a
/// rejected operation never changes any state.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Invalid phase: requires {expected}, election is in {actual}")]
    InvalidPhase {
        expected: ElectionPhase,
        actual: ElectionPhase,
    },
    #[error("Window closed: {0}")]
    WindowClosed(String),
    #[error("Already registered: {0}")]
    AlreadyRegistered(Principal),
    #[error("Already voted: {0}")]
    AlreadyVoted(Principal),
    #[error("Invalid candidate: {0}")]
    InvalidCandidate(CandidateId),
    #[error("No candidates in election {0}")]
    NoCandidates(ElectionId),
    #[error("Not registered: {0}")]
    NotRegistered(Principal),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl Error {
    /// A stable, machine-readable name for this kind of failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::AccessDenied(_) => "AccessDenied",
            Self::InvalidPhase { .. } => "InvalidPhase",
            Self::WindowClosed(_) => "WindowClosed",
            Self::AlreadyRegistered(_) => "AlreadyRegistered",
            Self::AlreadyVoted(_) => "AlreadyVoted",
            Self::InvalidCandidate(_) => "InvalidCandidate",
            Self::NoCandidates(_) => "NoCandidates",
            Self::NotRegistered(_) => "NotRegistered",
            Self::NotFound(_) => "NotFound",
            Self::Unauthorized(_) | Self::Jwt(_) => "Unauthorized",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::InvalidInput(_) => Status::BadRequest,
            Self::AccessDenied(_) => Status::Forbidden,
            Self::NotFound(_) | Self::InvalidCandidate(_) => Status::NotFound,
            Self::InvalidPhase { .. }
            | Self::WindowClosed(_)
            | Self::AlreadyRegistered(_)
            | Self::AlreadyVoted(_)
            | Self::NoCandidates(_)
            | Self::NotRegistered(_) => Status::Conflict,
            Self::Unauthorized(_) | Self::Jwt(_) => Status::Unauthorized,
        }
    }
}

/// The JSON body sent alongside an error status.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        Response::build_from(Json(body).respond_to(req)?)
            .status(status)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_rejections_are_conflicts() {
        let voter = Principal::new("v").unwrap();
        for error in [
            Error::WindowClosed("late".to_string()),
            Error::AlreadyRegistered(voter.clone()),
            Error::AlreadyVoted(voter.clone()),
            Error::NotRegistered(voter),
            Error::NoCandidates(1),
            Error::InvalidPhase {
                expected: ElectionPhase::Voting,
                actual: ElectionPhase::Ended,
            },
        ] {
            assert_eq!(error.status(), Status::Conflict, "{error}");
        }
    }

    #[test]
    fn messages_name_the_problem() {
        let error = Error::InvalidPhase {
            expected: ElectionPhase::Created,
            actual: ElectionPhase::Voting,
        };
        assert_eq!(
            error.to_string(),
            "Invalid phase: requires created, election is in voting"
        );
        assert_eq!(error.kind(), "InvalidPhase");
        assert_eq!(Error::InvalidCandidate(9).status(), Status::NotFound);
        assert_eq!(
            Error::AccessDenied("x".to_string()).status(),
            Status::Forbidden
        );
    }
}
