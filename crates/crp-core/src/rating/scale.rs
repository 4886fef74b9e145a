use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::CrpResult;

/// 10-level ordinal credit rating scale.
///
/// Investment grade: AAA through BBB. Speculative: BB, B.
/// Distressed/default: CCC through D. Lower score is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Aaa = 1,
    Aa = 2,
    A = 3,
    Bbb = 4,
    Bb = 5,
    B = 6,
    Ccc = 7,
    Cc = 8,
    C = 9,
    D = 10,
}

impl Rating {
    /// Numeric notch score, 1 = best, 10 = worst.
    pub fn score(self) -> u32 {
        self as u32
    }

    pub fn from_score(score: u32) -> CrpResult<Self> {
        match score {
            1 => Ok(Rating::Aaa),
            2 => Ok(Rating::Aa),
            3 => Ok(Rating::A),
            4 => Ok(Rating::Bbb),
            5 => Ok(Rating::Bb),
            6 => Ok(Rating::B),
            7 => Ok(Rating::Ccc),
            8 => Ok(Rating::Cc),
            9 => Ok(Rating::C),
            10 => Ok(Rating::D),
            other => Err(CrpError::InvalidInput {
                field: "rating_score".into(),
                reason: format!("Rating score must be 1-10, got {other}"),
            }),
        }
    }

    /// BBB or better.
    pub fn is_investment_grade(self) -> bool {
        self.score() <= 4
    }

    /// CCC or worse.
    pub fn is_distressed(self) -> bool {
        self.score() >= 7
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rating::Aaa => "AAA",
            Rating::Aa => "AA",
            Rating::A => "A",
            Rating::Bbb => "BBB",
            Rating::Bb => "BB",
            Rating::B => "B",
            Rating::Ccc => "CCC",
            Rating::Cc => "CC",
            Rating::C => "C",
            Rating::D => "D",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_roundtrip() {
        for score in 1..=10 {
            let rating = Rating::from_score(score).unwrap();
            assert_eq!(rating.score(), score);
        }
        assert!(Rating::from_score(0).is_err());
        assert!(Rating::from_score(11).is_err());
    }

    #[test]
    fn test_grade_boundaries() {
        assert!(Rating::Bbb.is_investment_grade());
        assert!(!Rating::Bb.is_investment_grade());
        assert!(!Rating::B.is_distressed());
        assert!(Rating::Ccc.is_distressed());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::Aaa.to_string(), "AAA");
        assert_eq!(Rating::Ccc.to_string(), "CCC");
        assert_eq!(Rating::D.to_string(), "D");
    }

    #[test]
    fn test_ordering_worse_is_greater() {
        assert!(Rating::D > Rating::C);
        assert!(Rating::Bbb > Rating::A);
    }
}
