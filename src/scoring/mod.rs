//! Radar scoring for valuation results.
//!
//! Shapes the five-axis radar chart the web front-end draws. Three score
//! sources exist, tried in order: the AI analysis radar score, the radar
//! score inside the valuation evaluation, and fixed defaults for legacy
//! summary-only results. Shape detection is by key presence: any result
//! carrying the `valuation_result` key (even `null`) is API-shaped and
//! never uses the legacy defaults. The overall score is the plain mean of
//! whichever rows apply, graded into a four-step performance level.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Input payload ─────────────────────────────────────────────────────────────

/// Five-axis radar score as produced by the valuation pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarScore {
    #[serde(default)]
    pub location_score: f64,
    #[serde(default)]
    pub legality_score: f64,
    #[serde(default)]
    pub liquidity_score: f64,
    #[serde(default)]
    pub evaluation_score: f64,
    #[serde(default)]
    pub dividend_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadarScoreHolder {
    #[serde(default, rename = "radarScore")]
    pub radar_score: Option<RadarScore>,
}

/// AI analysis attached to a combined result. The radar score may sit in
/// `data` or `result` depending on the pipeline version.
#[derive(Debug, Clone, Deserialize)]
pub struct AiAnalysis {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<RadarScoreHolder>,
    #[serde(default)]
    pub result: Option<RadarScoreHolder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Evaluation {
    #[serde(default, rename = "radarScore")]
    pub radar_score: Option<RadarScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValuationResult {
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoredCriterion {
    #[serde(default)]
    pub score: Option<f64>,
}

/// Per-criterion detail of a legacy (pre-API) result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryDetails {
    #[serde(default)]
    pub location: Option<ScoredCriterion>,
    #[serde(default)]
    pub legal: Option<ScoredCriterion>,
    #[serde(default)]
    pub utilities: Option<ScoredCriterion>,
    #[serde(default)]
    pub quality: Option<ScoredCriterion>,
    #[serde(default)]
    pub planning: Option<ScoredCriterion>,
}

/// `deserialize_with` helper keeping a present-but-`null` key apart from an
/// absent one: a present key always maps to `Some(..)`, an absent key stays
/// `None` through `default`.
fn present_key<'de, D>(deserializer: D) -> Result<Option<Option<ValuationResult>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<ValuationResult>::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/radar-score` — the combined valuation result.
///
/// Field naming is mixed by history: `valuation_result` and `ai_analysis`
/// are snake_case, `summaryDetails` is camelCase.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedResult {
    /// Double-wrapped because key presence, not value, marks an API-shaped
    /// result: `{"valuation_result": null}` is still API-shaped.
    #[serde(default, deserialize_with = "present_key")]
    pub valuation_result: Option<Option<ValuationResult>>,
    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default, rename = "summaryDetails")]
    pub summary_details: Option<SummaryDetails>,
}

// ── Output payload ────────────────────────────────────────────────────────────

/// One radar axis with its display color.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionScore {
    pub criterion: &'static str,
    pub score: f64,
    pub color: &'static str,
}

/// Response body of `POST /api/radar-score`.
#[derive(Debug, Clone, Serialize)]
pub struct RadarSummary {
    /// Mean of the criterion scores; `0.0` when no rows apply.
    pub overall: f64,
    /// Grade label, absent when no rows apply.
    pub level: Option<&'static str>,
    pub criteria: Vec<CriterionScore>,
}

/// Four-step grade over the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl PerformanceLevel {
    pub fn classify(score: f64) -> Self {
        if score >= 8.0 {
            PerformanceLevel::Excellent
        } else if score >= 6.5 {
            PerformanceLevel::Good
        } else if score >= 5.0 {
            PerformanceLevel::Average
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceLevel::Excellent => "Xuất sắc",
            PerformanceLevel::Good => "Tốt",
            PerformanceLevel::Average => "Trung bình",
            PerformanceLevel::NeedsImprovement => "Cần cải thiện",
        }
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────────

const GREEN: &str = "#10b981";
const BLUE: &str = "#3b82f6";
const AMBER: &str = "#f59e0b";
const PURPLE: &str = "#8b5cf6";
const RED: &str = "#ef4444";

impl RadarSummary {
    pub fn from_result(result: &CombinedResult) -> Self {
        let criteria = score_rows(result);
        if criteria.is_empty() {
            return Self {
                overall: 0.0,
                level: None,
                criteria,
            };
        }
        let overall =
            criteria.iter().map(|c| c.score).sum::<f64>() / criteria.len() as f64;
        Self {
            overall,
            level: Some(PerformanceLevel::classify(overall).label()),
            criteria,
        }
    }
}

fn row(criterion: &'static str, score: f64, color: &'static str) -> CriterionScore {
    CriterionScore {
        criterion,
        score,
        color,
    }
}

/// Truthiness of the legacy `summary` field as the front-end reads it:
/// `null`, `false`, `0` and the empty string all mean "no summary".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn score_rows(result: &CombinedResult) -> Vec<CriterionScore> {
    // An API-shaped result carries the `valuation_result` key, `null`
    // included; only those may use the AI radar score.
    if let Some(valuation) = &result.valuation_result {
        let ai_score = result
            .ai_analysis
            .as_ref()
            .filter(|analysis| analysis.success)
            .and_then(|analysis| {
                analysis
                    .data
                    .as_ref()
                    .and_then(|holder| holder.radar_score.as_ref())
                    .or_else(|| {
                        analysis
                            .result
                            .as_ref()
                            .and_then(|holder| holder.radar_score.as_ref())
                    })
            });
        if let Some(score) = ai_score {
            return vec![
                row("Vị trí", score.location_score, GREEN),
                row("Pháp lý", score.legality_score, BLUE),
                row("Thanh khoản", score.liquidity_score, AMBER),
                row("Thẩm định", score.evaluation_score, PURPLE),
                row("Sinh lời", score.dividend_score, RED),
            ];
        }
        if let Some(score) = valuation
            .as_ref()
            .and_then(|valuation| valuation.evaluation.as_ref())
            .and_then(|evaluation| evaluation.radar_score.as_ref())
        {
            return vec![
                row("Vị trí", score.location_score, GREEN),
                row("Pháp lý", score.legality_score, BLUE),
                row("Thanh khoản", score.liquidity_score, AMBER),
                row("Sinh lời", score.dividend_score, RED),
            ];
        }
        return Vec::new();
    }

    // Legacy results only have a text summary; a blank or zero summary does
    // not count. Historical defaults fill any criterion whose score is
    // missing or zero.
    if result.summary.as_ref().is_some_and(is_truthy) {
        let details = result.summary_details.clone().unwrap_or_default();
        let score_of = |criterion: &Option<ScoredCriterion>, default: f64| {
            criterion
                .as_ref()
                .and_then(|c| c.score)
                .filter(|score| *score != 0.0)
                .unwrap_or(default)
        };
        return vec![
            row("Vị trí", score_of(&details.location, 7.0), GREEN),
            row("Pháp lý", score_of(&details.legal, 8.0), BLUE),
            row("Thanh khoản", score_of(&details.utilities, 6.0), AMBER),
            row("Chất lượng", score_of(&details.quality, 7.0), PURPLE),
            row("Quy hoạch", score_of(&details.planning, 8.0), RED),
        ];
    }

    Vec::new()
}
