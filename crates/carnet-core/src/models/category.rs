//! Category model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::validation::is_hex_color;

/// Palette offered when creating a category
pub const PREDEFINED_COLORS: [&str; 12] = [
    "#FF5733", "#33FF57", "#3357FF", "#FF33A8", "#33B5FF", "#FFD633", "#FF8C33", "#9C27B0",
    "#673AB7", "#009688", "#795548", "#607D8B",
];

/// Backend identifier of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CategoryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A category used to group notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Payload for creating a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
}

impl CategoryDraft {
    /// Build a draft, defaulting to the first palette color.
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            color: color.unwrap_or_else(|| PREDEFINED_COLORS[0].to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("category name is required".to_string()));
        }
        if !is_hex_color(&self.color) {
            return Err(Error::Validation(format!(
                "category color must look like #RRGGBB, got `{}`",
                self.color
            )));
        }
        Ok(())
    }
}
