use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The identity of a caller, as vouched for by the authentication layer.
/// Principals carry no structure beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("principal must not be empty".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = Error;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_principal_rejected() {
        assert!(matches!(Principal::new(""), Err(Error::InvalidInput(_))));
        assert!(matches!(Principal::new("  "), Err(Error::InvalidInput(_))));
        assert_eq!(Principal::new("alice").unwrap().as_str(), "alice");
    }
}
