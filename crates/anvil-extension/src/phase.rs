//! Build phases

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Extension phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Contribute classes and meta-annotations before the archive is final
    Discovery,
    /// Transform annotations through the overlay
    Enhancement,
    /// Register synthetic beans and observers
    Synthesis,
    /// Inspect the final deployment and report problems
    Validation,
}

impl Phase {
    /// Every phase in execution order
    pub const ALL: [Self; 4] = [Self::Discovery, Self::Enhancement, Self::Synthesis, Self::Validation];

    /// Position in execution order
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Following phase
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Discovery => Some(Self::Enhancement),
            Self::Enhancement => Some(Self::Synthesis),
            Self::Synthesis => Some(Self::Validation),
            Self::Validation => None,
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Enhancement => "enhancement",
            Self::Synthesis => "synthesis",
            Self::Validation => "validation",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_chain_in_order() {
        let mut walked = vec![Phase::Discovery];
        while let Some(next) = walked.last().and_then(|p| p.next()) {
            walked.push(next);
        }
        assert_eq!(walked, Phase::ALL);
        assert!(Phase::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Phase::Synthesis.ordinal(), 2);
    }
}
