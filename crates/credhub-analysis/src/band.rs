//! Score-to-classification banding.

use std::fmt;

/// Four-tier classification of a 0-100 credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Regular,
    Poor,
}

impl ScoreBand {
    /// Bands a score: `>= 80` excellent, `>= 70` good, `>= 60` regular,
    /// anything else poor.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Regular
        } else {
            Self::Poor
        }
    }

    /// The label the analysis webhook uses for this band.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excelente",
            Self::Good => "Bom",
            Self::Regular => "Regular",
            Self::Poor => "Ruim",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
