use crate::config::AssistantConfig;
use crate::context::select_context;
use crate::history::ConversationHistory;
use crate::language::{detect_language, is_simple_greeting};
use crate::llm::prompts::{render_system_instruction, template};
use crate::llm::types::CompletionRequest;
use crate::llm::CompletionService;
use crate::schema::{ConversationTurn, Language};
use crate::AnalyticsContext;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

/// Answers questions about the budget data through a text-generation service,
/// keeping a bounded per-session history.
pub struct ConversationalAssistant<S> {
    analytics: Arc<AnalyticsContext>,
    service: Option<S>,
    config: AssistantConfig,
    history: ConversationHistory,
}

impl<S: CompletionService> ConversationalAssistant<S> {
    pub fn new(analytics: Arc<AnalyticsContext>, service: Option<S>, config: AssistantConfig) -> Self {
        let history = ConversationHistory::new(config.history_capacity);
        Self {
            analytics,
            service,
            config,
            history,
        }
    }

    pub fn analytics(&self) -> &AnalyticsContext {
        &self.analytics
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// System instruction plus raw question, as sent to the service.
    pub fn build_request(&self, question: &str, language: Language) -> CompletionRequest {
        let t = template(language);
        let data_context = select_context(question, self.analytics.dataset(), self.analytics.insights());
        let conversation_context = self.history.render(
            self.config.history_window,
            self.config.answer_excerpt_chars,
            t.history_label,
            t.question_label,
            t.answer_label,
        );

        CompletionRequest {
            model: self.config.model.clone(),
            system: render_system_instruction(language, &data_context, &conversation_context),
            user: question.to_string(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Never fails: greetings get a canned reply, service problems come back as a
    /// localized message. History is only appended once an answer has arrived.
    pub async fn answer(&mut self, question: &str) -> String {
        let language = detect_language(question);
        let t = template(language);

        if is_simple_greeting(question) {
            debug!("Greeting detected, skipping the generation service");
            return t.greeting.to_string();
        }

        let Some(service) = self.service.as_ref() else {
            warn!("Question received but no generation service is configured");
            return t.not_configured.to_string();
        };

        let request = self.build_request(question, language);
        let outcome = service.complete(&request).await;

        match outcome {
            Ok(answer) => {
                self.history.push(ConversationTurn {
                    timestamp: Utc::now(),
                    question: question.to_string(),
                    answer: answer.clone(),
                    language,
                });
                info!(
                    "Answered question in {} ({} turns in history)",
                    language,
                    self.history.len()
                );
                answer
            }
            Err(e) => {
                warn!("Generation service call failed: {}", e);
                format!("{}: {}", t.service_error, e)
            }
        }
    }
}
