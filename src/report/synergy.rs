// Synergy score and its letter grade

use super::ReportError;
use serde::{Deserialize, Serialize};

/// Lower bounds (inclusive) of each grade
pub const GRADE_S_MIN: f64 = 90.0;
pub const GRADE_A_MIN: f64 = 80.0;
pub const GRADE_B_MIN: f64 = 70.0;
pub const GRADE_C_MIN: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyGrade {
    S,
    A,
    B,
    C,
    D,
}

impl SynergyGrade {
    /// Map a 0-100 score to its grade. Out-of-range input is clamped.
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) };
        if score >= GRADE_S_MIN {
            SynergyGrade::S
        } else if score >= GRADE_A_MIN {
            SynergyGrade::A
        } else if score >= GRADE_B_MIN {
            SynergyGrade::B
        } else if score >= GRADE_C_MIN {
            SynergyGrade::C
        } else {
            SynergyGrade::D
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SynergyGrade::S => "Exceptional fit",
            SynergyGrade::A => "Strong fit",
            SynergyGrade::B => "Good fit",
            SynergyGrade::C => "Moderate fit",
            SynergyGrade::D => "Weak fit",
        }
    }
}

impl std::fmt::Display for SynergyGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            SynergyGrade::S => "S",
            SynergyGrade::A => "A",
            SynergyGrade::B => "B",
            SynergyGrade::C => "C",
            SynergyGrade::D => "D",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyScore {
    pub score: f64,
    pub grade: SynergyGrade,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
}

impl SynergyScore {
    /// Build a score; the grade is always derived, never supplied
    pub fn new(
        score: f64,
        opportunities: Vec<String>,
        risks: Vec<String>,
    ) -> Result<Self, ReportError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(ReportError::OutOfRange {
                field: "synergyScore.score".to_string(),
                value: score,
            });
        }
        Ok(Self {
            score,
            grade: SynergyGrade::from_score(score),
            opportunities,
            risks,
        })
    }
}

impl Default for SynergyScore {
    fn default() -> Self {
        Self {
            score: 0.0,
            grade: SynergyGrade::D,
            opportunities: Vec::new(),
            risks: Vec::new(),
        }
    }
}
