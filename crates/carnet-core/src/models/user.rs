//! User profile model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Profile of the signed-in account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// A profile is usable only with a non-zero id and a non-blank email.
    pub fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(Error::Validation("user id is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(Error::Validation("user email is required".to_string()));
        }
        Ok(())
    }

    /// Parse a profile previously written by [`User::to_stored_json`].
    ///
    /// Anything that is not a JSON object with a usable `id` and `email` is
    /// reported as [`Error::MalformedProfile`].
    pub fn from_stored_json(raw: &str) -> Result<Self> {
        let stored: StoredUser = serde_json::from_str(raw)
            .map_err(|error| Error::MalformedProfile(error.to_string()))?;

        let id = stored
            .id
            .filter(|id| *id != 0)
            .ok_or_else(|| Error::MalformedProfile("missing `id`".to_string()))?;
        let email = stored
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| Error::MalformedProfile("missing `email`".to_string()))?;

        Ok(Self {
            id,
            name: stored.name.unwrap_or_default(),
            email,
        })
    }

    pub fn to_stored_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short human label, preferring the display name.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoredUser {
    id: Option<i64>,
    name: Option<String>,
    email: Option<String>,
}
