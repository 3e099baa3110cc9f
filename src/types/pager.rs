// src/types/pager.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// PAGER alert level: the estimated impact of an event, from little or no
/// damage (green) to severe (red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagerLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl PagerLevel {
    pub const ALL: [PagerLevel; 4] = [
        PagerLevel::Green,
        PagerLevel::Yellow,
        PagerLevel::Orange,
        PagerLevel::Red,
    ];

    /// The literal token the service expects for `alertlevel`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PagerLevel::Green => "green",
            PagerLevel::Yellow => "yellow",
            PagerLevel::Orange => "orange",
            PagerLevel::Red => "red",
        }
    }
}

impl fmt::Display for PagerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PagerLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        PagerLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::new(
                    "pager_level",
                    format!(
                        "invalid pager level '{}' (expected green, yellow, orange or red)",
                        s
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ORANGE".parse::<PagerLevel>(), Ok(PagerLevel::Orange));
        assert_eq!(" red\n".parse::<PagerLevel>(), Ok(PagerLevel::Red));
    }

    #[test]
    fn purple_is_rejected() {
        let err = "purple".parse::<PagerLevel>().unwrap_err();
        assert_eq!(err.field, "pager_level");
        assert!(err.constraint.contains("invalid pager level"));
    }
}
