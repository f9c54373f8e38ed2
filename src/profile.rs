//! Training profile vocabulary shared by the program generator and the store.
//!
//! Both enums are open: any submitted string parses, and values outside the
//! known set are kept verbatim in `Other` so callers can decide what to do
//! with them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Training level. Selects the weekly base plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Other(String),
}

impl Experience {
    pub fn as_str(&self) -> &str {
        match self {
            Experience::Beginner => "beginner",
            Experience::Intermediate => "intermediate",
            Experience::Advanced => "advanced",
            Experience::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Experience::Other(_))
    }
}

impl From<&str> for Experience {
    fn from(value: &str) -> Self {
        match value {
            "beginner" => Experience::Beginner,
            "intermediate" => Experience::Intermediate,
            "advanced" => Experience::Advanced,
            other => Experience::Other(other.to_string()),
        }
    }
}

impl From<String> for Experience {
    fn from(value: String) -> Self {
        Experience::from(value.as_str())
    }
}

impl From<Experience> for String {
    fn from(value: Experience) -> Self {
        match value {
            Experience::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training objective. Selects the extra line appended to the plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Goal {
    #[default]
    Strength,
    Technique,
    Endurance,
    Other(String),
}

impl Goal {
    pub fn as_str(&self) -> &str {
        match self {
            Goal::Strength => "strength",
            Goal::Technique => "technique",
            Goal::Endurance => "endurance",
            Goal::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Goal::Other(_))
    }
}

impl From<&str> for Goal {
    fn from(value: &str) -> Self {
        match value {
            "strength" => Goal::Strength,
            "technique" => Goal::Technique,
            "endurance" => Goal::Endurance,
            other => Goal::Other(other.to_string()),
        }
    }
}

impl From<String> for Goal {
    fn from(value: String) -> Self {
        Goal::from(value.as_str())
    }
}

impl From<Goal> for String {
    fn from(value: Goal) -> Self {
        match value {
            Goal::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
