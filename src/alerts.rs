use crate::config::Thresholds;
use crate::language::detect_language;
use crate::schema::{ApprovalStatus, Language};
use crate::utils::{format_amount, mean, sample_std, window_start};
use crate::AnalyticsContext;
use serde::Serialize;

const DECLINE_KEYWORDS: &[&str] = &["baisse", "diminution", "decline", "decrease", "انخفاض"];
const FORECAST_KEYWORDS: &[&str] = &["prévision", "forecast"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    HighBudget { entity: String, amount: f64 },
    LowBudget { entity: String, amount: f64 },
    HighRejection,
    NegativeTrend,
    ForecastReminder,
}

impl Alert {
    pub fn render(&self, language: Language) -> String {
        match (self, language) {
            (Self::HighBudget { entity, amount }, Language::French) => {
                format!("⚠️ Budget élevé détecté pour {}: {} TND", entity, format_amount(*amount))
            }
            (Self::HighBudget { entity, amount }, Language::English) => {
                format!("⚠️ High budget detected for {}: {} TND", entity, format_amount(*amount))
            }
            (Self::HighBudget { entity, amount }, Language::Arabic) => {
                format!("⚠️ ميزانية مرتفعة مكتشفة لـ {}: {} دينار", entity, format_amount(*amount))
            }
            (Self::LowBudget { entity, amount }, Language::French) => {
                format!("⚠️ Budget faible détecté pour {}: {} TND", entity, format_amount(*amount))
            }
            (Self::LowBudget { entity, amount }, Language::English) => {
                format!("⚠️ Low budget detected for {}: {} TND", entity, format_amount(*amount))
            }
            (Self::LowBudget { entity, amount }, Language::Arabic) => {
                format!("⚠️ ميزانية منخفضة مكتشفة لـ {}: {} دينار", entity, format_amount(*amount))
            }
            (Self::HighRejection, Language::French) => "⚠️ Taux de rejet des budgets élevé (>30%)".to_string(),
            (Self::HighRejection, Language::English) => "⚠️ High budget rejection rate (>30%)".to_string(),
            (Self::HighRejection, Language::Arabic) => "⚠️ معدل رفض ميزانيات مرتفع (>30%)".to_string(),
            (Self::NegativeTrend, Language::French) => "⚠️ Tendance négative détectée dans les données".to_string(),
            (Self::NegativeTrend, Language::English) => "⚠️ Negative trend detected in the data".to_string(),
            (Self::NegativeTrend, Language::Arabic) => "⚠️ اتجاه سلبي مكتشف في البيانات".to_string(),
            (Self::ForecastReminder, Language::French) => {
                "⚠️ Attention: Les données après mars 2025 sont des prévisions".to_string()
            }
            (Self::ForecastReminder, Language::English) => {
                "⚠️ Attention: Data after March 2025 are forecasts".to_string()
            }
            (Self::ForecastReminder, Language::Arabic) => "⚠️ تنبيه: البيانات بعد مارس 2025 هي توقعات".to_string(),
        }
    }
}

/// Per-record outliers in the trailing window. Mean and deviation come from the
/// whole dataset, forecast rows included.
pub fn budget_anomalies(analytics: &AnalyticsContext, thresholds: &Thresholds) -> Vec<Alert> {
    let dataset = analytics.dataset();
    let Some(max_date) = dataset.max_date() else {
        return Vec::new();
    };

    let budgets: Vec<f64> = dataset.records().iter().map(|r| r.budget).collect();
    let (Some(avg), Some(std)) = (mean(&budgets), sample_std(&budgets)) else {
        return Vec::new();
    };

    let upper = avg + thresholds.anomaly_sigma * std;
    let lower = avg - thresholds.anomaly_sigma * std;
    let since = window_start(max_date, thresholds.anomaly_window_days);

    dataset
        .records()
        .iter()
        .filter(|r| r.date >= since)
        .filter_map(|r| {
            if r.budget > upper {
                Some(Alert::HighBudget {
                    entity: r.entity.clone(),
                    amount: r.budget,
                })
            } else if r.budget < lower {
                Some(Alert::LowBudget {
                    entity: r.entity.clone(),
                    amount: r.budget,
                })
            } else {
                None
            }
        })
        .collect()
}

pub fn rejection_rate(analytics: &AnalyticsContext) -> f64 {
    let records = analytics.dataset().records();
    if records.is_empty() {
        return 0.0;
    }
    let rejected = records
        .iter()
        .filter(|r| r.approval_status == ApprovalStatus::Rejected)
        .count();
    rejected as f64 / records.len() as f64
}

/// All applicable alerts, capped. Dataset-wide and question-driven alerts rank
/// ahead of per-record anomalies so the cap cannot hide them.
pub fn detect_alerts(
    analytics: &AnalyticsContext,
    thresholds: &Thresholds,
    answer: &str,
    question: &str,
) -> Vec<Alert> {
    if analytics.dataset().is_empty() {
        return Vec::new();
    }

    let mut alerts = Vec::new();

    if rejection_rate(analytics) > thresholds.rejection_rate {
        alerts.push(Alert::HighRejection);
    }

    let answer_lower = answer.to_lowercase();
    if DECLINE_KEYWORDS.iter().any(|k| answer_lower.contains(k)) {
        alerts.push(Alert::NegativeTrend);
    }

    let question_lower = question.to_lowercase();
    if FORECAST_KEYWORDS.iter().any(|k| question_lower.contains(k)) {
        alerts.push(Alert::ForecastReminder);
    }

    alerts.extend(budget_anomalies(analytics, thresholds));
    alerts.truncate(thresholds.max_alerts);
    alerts
}

/// Rendered alerts in the language of the answer.
pub fn alerts(analytics: &AnalyticsContext, thresholds: &Thresholds, answer: &str, question: &str) -> Vec<String> {
    let language = detect_language(answer);
    detect_alerts(analytics, thresholds, answer, question)
        .iter()
        .map(|alert| alert.render(language))
        .collect()
}
