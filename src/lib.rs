//! # Postal Budget Analyst
//!
//! Analytics core for a budget chatbot serving a national postal operator.
//!
//! ## Core Concepts
//!
//! - **Dataset**: budget records loaded once from CSV, split into historical and forecast views
//! - **Insight Snapshot**: aggregates (per entity, year, month, category, seasonal impacts, trends)
//!   computed once per load and shared read-only by every session
//! - **Context Selection**: a keyword router that picks which aggregate tables accompany a question
//!   sent to the text-generation service
//! - **Alerts & Suggestions**: rule-based warnings and follow-up questions over the same aggregates
//!
//! ## Example
//!
//! ```rust,ignore
//! use postal_budget_analyst::*;
//! use std::sync::Arc;
//!
//! let dataset = load_or_empty("data/budget.csv");
//! let analytics = Arc::new(AnalyticsContext::new(dataset));
//!
//! let client = GroqClient::from_env()?;
//! let mut assistant = BudgetAssistant::new(analytics, Some(client), AssistantConfig::from_env()?);
//!
//! let result = assistant.process_query("Quel est le budget par région ?").await;
//! println!("{}", result.response);
//! for alert in &result.alerts {
//!     println!("{}", alert);
//! }
//! ```

pub mod alerts;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod history;
pub mod ingestion;
pub mod insights;
pub mod language;
pub mod llm;
pub mod query;
pub mod report;
pub mod schema;
pub mod seasonality;
pub mod stats;
pub mod suggestions;
pub mod utils;

pub use alerts::Alert;
pub use config::{AssistantConfig, Thresholds};
pub use context::{matched_topics, select_context, Topic};
pub use dataset::BudgetDataset;
pub use error::{BudgetChatError, Result};
pub use history::{ConversationHistory, ConversationSummary};
pub use ingestion::{load_csv, load_or_empty};
pub use insights::{compute_insights, InsightSnapshot, TrendSummary};
pub use language::{detect_language, is_simple_greeting};
pub use llm::{CompletionRequest, CompletionService, ConversationalAssistant};
#[cfg(feature = "groq")]
pub use llm::GroqClient;
pub use query::{BudgetAssistant, QueryResult};
pub use report::{BudgetReport, ExportSheets, ReportFilter};
pub use schema::*;
pub use seasonality::SeasonalFlag;
pub use stats::QuickStats;
pub use suggestions::{Insight, SuggestionTopic};

use log::info;

/// The loaded dataset and its insight snapshot. Built once, then shared behind
/// `Arc` by every session.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsContext {
    dataset: BudgetDataset,
    insights: InsightSnapshot,
}

impl AnalyticsContext {
    pub fn new(dataset: BudgetDataset) -> Self {
        let insights = compute_insights(dataset.records());
        if insights.is_empty() {
            info!("Analytics context created without data");
        } else {
            info!(
                "Analytics context ready: {} records, {} entities, {} months",
                insights.record_count,
                insights.budget_by_entity.len(),
                insights.budget_by_month.len()
            );
        }
        Self { dataset, insights }
    }

    pub fn dataset(&self) -> &BudgetDataset {
        &self.dataset
    }

    pub fn insights(&self) -> &InsightSnapshot {
        &self.insights
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}
