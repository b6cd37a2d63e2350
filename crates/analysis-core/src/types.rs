use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on contributing-factor strings carried by a score record.
pub const MAX_FACTORS: usize = 5;

/// Upper bound on highlight strings in the frontend summary projection.
pub const MAX_HIGHLIGHTS: usize = 4;

/// Overall investment grade ladder with its fixed recommendation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "N/A")]
    NotRated,
}

impl OverallGrade {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => OverallGrade::APlus,
            s if s >= 75.0 => OverallGrade::A,
            s if s >= 65.0 => OverallGrade::BPlus,
            s if s >= 55.0 => OverallGrade::B,
            s if s >= 45.0 => OverallGrade::CPlus,
            s if s >= 35.0 => OverallGrade::C,
            s if s >= 25.0 => OverallGrade::D,
            s if s > 0.0 => OverallGrade::DMinus,
            _ => OverallGrade::NotRated,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OverallGrade::APlus => "A+",
            OverallGrade::A => "A",
            OverallGrade::BPlus => "B+",
            OverallGrade::B => "B",
            OverallGrade::CPlus => "C+",
            OverallGrade::C => "C",
            OverallGrade::D => "D",
            OverallGrade::DMinus => "D-",
            OverallGrade::NotRated => "N/A",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            OverallGrade::APlus => "Strong Buy",
            OverallGrade::A | OverallGrade::BPlus => "Buy",
            OverallGrade::B | OverallGrade::CPlus => "Hold",
            OverallGrade::C => "Weak Hold",
            OverallGrade::D | OverallGrade::DMinus => "Sell",
            OverallGrade::NotRated => "Data Unavailable",
        }
    }
}

/// Qualitative risk level derived from accumulated risk points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_points(points: u32) -> Self {
        match points {
            p if p >= 40 => RiskLevel::High,
            p if p >= 20 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// One component score (Reliability, Growth Scope, or Valuation
/// Attractiveness) on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub component: String,
    pub score: f64,
    pub grade: String,
    /// Contributing factors, strongest first, capped at [`MAX_FACTORS`].
    pub factors: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

impl ScoreResult {
    pub fn new(
        component: impl Into<String>,
        score: f64,
        grade: impl Into<String>,
        mut factors: Vec<String>,
        computed_at: DateTime<Utc>,
    ) -> Self {
        factors.truncate(MAX_FACTORS);
        Self {
            component: component.into(),
            score: score.clamp(0.0, 100.0),
            grade: grade.into(),
            factors,
            computed_at,
        }
    }
}

/// Complete investability assessment for one symbol. Always produced in full:
/// missing source data degrades component scores instead of removing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub symbol: String,
    pub reliability: ScoreResult,
    pub growth: ScoreResult,
    pub valuation: ScoreResult,
    pub overall_score: f64,
    pub overall_grade: OverallGrade,
    pub recommendation: String,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

/// Slim projection of an assessment for direct frontend display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub symbol: String,
    pub reliability_score: f64,
    pub growth_score: f64,
    pub valuation_score: f64,
    pub overall_score: f64,
    pub overall_grade: OverallGrade,
    pub recommendation: String,
    pub risk_level: RiskLevel,
    /// Capped at [`MAX_HIGHLIGHTS`].
    pub key_highlights: Vec<String>,
}
