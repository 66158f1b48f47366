use crate::schema::ApprovalStatus;
use crate::suggestions::revenue_share;
use crate::utils::{share_percent, strip_entity_prefix};
use crate::AnalyticsContext;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const STATS_KEYWORDS: &[&str] = &["statistique", "résumé", "stats", "summary"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Headline numbers shown next to an answer when the user asks for a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuickStats {
    pub total_records: usize,
    pub total_budget: f64,
    pub avg_budget: f64,
    pub date_range: DateRange,
    pub entities: usize,
    /// Entity with the largest total, region prefix removed.
    pub top_entity: String,
    pub approval_rate: f64,
    pub forecast_percentage: f64,
    pub revenue_share: f64,
}

impl QuickStats {
    pub fn compute(analytics: &AnalyticsContext) -> Option<Self> {
        let dataset = analytics.dataset();
        let insights = analytics.insights();
        let date_range = DateRange {
            start: dataset.min_date()?,
            end: dataset.max_date()?,
        };

        let mut top: Option<(&String, f64)> = None;
        for (entity, total) in &insights.budget_by_entity {
            if top.map_or(true, |(_, best)| *total > best) {
                top = Some((entity, *total));
            }
        }
        let top_entity = top.map(|(e, _)| strip_entity_prefix(e).to_string())?;

        let n = dataset.len() as f64;
        let approved = dataset
            .records()
            .iter()
            .filter(|r| r.approval_status == ApprovalStatus::Approved)
            .count() as f64;
        let forecast = dataset.forecast().count() as f64;

        Some(Self {
            total_records: dataset.len(),
            total_budget: insights.total_budget,
            avg_budget: insights.avg_budget,
            date_range,
            entities: insights.budget_by_entity.len(),
            top_entity,
            approval_rate: share_percent(approved, n),
            forecast_percentage: share_percent(forecast, n),
            revenue_share: revenue_share(analytics).unwrap_or(0.0) * 100.0,
        })
    }

    pub fn requested_by(query: &str) -> bool {
        let lowered = query.to_lowercase();
        STATS_KEYWORDS.iter().any(|k| lowered.contains(k))
    }
}
