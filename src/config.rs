use crate::error::{BudgetChatError, Result};
use serde::{Deserialize, Serialize};

/// Business thresholds used by alerts, suggestions and report recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Share of rejected records above which a rejection alert fires.
    pub rejection_rate: f64,
    /// Max entity mean over min entity mean above which rebalancing is suggested.
    pub imbalance_ratio: f64,
    /// Revenue share below which an increase-revenue suggestion fires.
    pub min_revenue_share: f64,
    pub anomaly_window_days: u64,
    pub anomaly_sigma: f64,
    pub max_alerts: usize,
    pub max_suggestions: usize,
    pub report_rejection_rate: f64,
    pub report_entity_dispersion: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rejection_rate: 0.30,
            imbalance_ratio: 1.5,
            min_revenue_share: 0.40,
            anomaly_window_days: 90,
            anomaly_sigma: 2.0,
            max_alerts: 3,
            max_suggestions: 3,
            report_rejection_rate: 0.20,
            report_entity_dispersion: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Turns kept in the history buffer.
    pub history_capacity: usize,
    /// Turns surfaced to the model.
    pub history_window: usize,
    pub answer_excerpt_chars: usize,
    pub thresholds: Thresholds,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "llama3-8b-8192".to_string(),
            temperature: 0.25,
            max_tokens: 2000,
            request_timeout_secs: 60,
            history_capacity: 25,
            history_window: 5,
            answer_excerpt_chars: 250,
            thresholds: Thresholds::default(),
        }
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| BudgetChatError::InvalidConfig(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

impl AssistantConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `BUDGET_CHAT_MODEL`, `BUDGET_CHAT_TEMPERATURE` and `BUDGET_CHAT_MAX_TOKENS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("BUDGET_CHAT_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }
        if let Some(temperature) = env_number::<f32>("BUDGET_CHAT_TEMPERATURE")? {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = env_number::<u32>("BUDGET_CHAT_MAX_TOKENS")? {
            config.max_tokens = max_tokens;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(BudgetChatError::InvalidConfig(format!(
                "temperature {} must be between 0.0 and 2.0",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(BudgetChatError::InvalidConfig(
                "max_tokens must be positive".to_string(),
            ));
        }
        if self.history_window > self.history_capacity {
            return Err(BudgetChatError::InvalidConfig(format!(
                "history_window {} exceeds history_capacity {}",
                self.history_window, self.history_capacity
            )));
        }
        Ok(())
    }
}
