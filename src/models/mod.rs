//! Dependency model shared by configuration, resolver and CLI.

mod dependency;
mod spec;

pub use dependency::{Dependency, DependencyKind, Parent};
pub use spec::{DependencySpec, DetailedDependency, parse_notation};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::GopmError;

/// What resolving a dependency required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// Present and fresh, nothing fetched
    AlreadySatisfied,
    /// Fetched during this run
    Downloaded,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadySatisfied => "already satisfied",
            Self::Downloaded => "downloaded",
        })
    }
}

/// Dependency sets a project declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    /// Needed to build
    Build,
    /// Needed by tests only
    Test,
    /// Tools run during the build
    Tool,
}

impl Configuration {
    /// Every configuration, in declaration order.
    pub const ALL: [Self; 3] = [Self::Build, Self::Test, Self::Tool];

    /// Lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Configuration {
    type Err = GopmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.name() == value).ok_or_else(|| GopmError::Other {
            message: format!("Unknown configuration '{value}'. Expected one of build, test, tool."),
        })
    }
}
