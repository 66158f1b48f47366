use crate::error::{BudgetChatError, Result};
use crate::llm::types::*;
use crate::llm::CompletionService;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Chat-completions client for Groq's OpenAI-compatible endpoint. One attempt per call.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GROQ_BASE_URL.to_string(),
        }
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: GROQ_BASE_URL.to_string(),
        })
    }

    /// Points the client at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(BudgetChatError::ServiceNotConfigured)?;
        Ok(Self::new(api_key))
    }

    async fn chat_completion(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatCompletionRequest::from(request);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(BudgetChatError::ServiceError(format!(
                "Groq API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: ChatCompletionResponse = res.json().await?;
        body.first_text()
            .map(str::to_string)
            .ok_or(BudgetChatError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionService for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.chat_completion(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_override_trims_slash() {
        let client = GroqClient::new("key".to_string()).with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
