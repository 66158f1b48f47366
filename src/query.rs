use crate::alerts::alerts;
use crate::config::AssistantConfig;
use crate::history::{ConversationHistory, ConversationSummary};
use crate::llm::{CompletionService, ConversationalAssistant};
use crate::report::{BudgetReport, ReportFilter};
use crate::stats::QuickStats;
use crate::suggestions::suggestions;
use crate::AnalyticsContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// What the UI layer receives for one user query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub response: String,
    pub alerts: Vec<String>,
    pub suggestions: Vec<String>,
    pub stats: Option<QuickStats>,
    pub timestamp: DateTime<Utc>,
}

/// One chat session over a shared, read-only dataset.
pub struct BudgetAssistant<S> {
    inner: ConversationalAssistant<S>,
}

impl<S: CompletionService> BudgetAssistant<S> {
    pub fn new(analytics: Arc<AnalyticsContext>, service: Option<S>, config: AssistantConfig) -> Self {
        Self {
            inner: ConversationalAssistant::new(analytics, service, config),
        }
    }

    pub fn analytics(&self) -> &AnalyticsContext {
        self.inner.analytics()
    }

    pub fn history(&self) -> &ConversationHistory {
        self.inner.history()
    }

    pub async fn answer(&mut self, question: &str) -> String {
        self.inner.answer(question).await
    }

    pub async fn process_query(&mut self, text: &str) -> QueryResult {
        let response = self.inner.answer(text).await;
        let analytics = self.inner.analytics();
        let thresholds = &self.inner.config().thresholds;

        let stats = if QuickStats::requested_by(text) {
            QuickStats::compute(analytics)
        } else {
            None
        };

        QueryResult {
            alerts: alerts(analytics, thresholds, &response, text),
            suggestions: suggestions(analytics, thresholds, &response, text),
            stats,
            response,
            timestamp: Utc::now(),
        }
    }

    pub fn quick_stats(&self) -> Option<QuickStats> {
        QuickStats::compute(self.inner.analytics())
    }

    pub fn conversation_summary(&self) -> Option<ConversationSummary> {
        self.inner.history().summary()
    }

    pub fn report(&self, filter: &ReportFilter) -> Option<BudgetReport> {
        BudgetReport::build(self.inner.analytics(), filter, &self.inner.config().thresholds)
    }
}
