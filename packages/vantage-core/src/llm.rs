//! LLM gateway - role-scoped generation with bounded retry.
//!
//! The gateway never errors out to callers: after exhausting its retry
//! budget it returns `None`, which callers must treat as "assistant
//! unavailable", never as an empty valid answer.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::config::DEFAULT_LLM_ATTEMPTS;

/// Role context selecting the system instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleContext {
    #[default]
    General,
    Political,
    Policy,
    Writer,
}

impl RoleContext {
    /// Parse a role name; unknown names fall back to `General`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "political" => RoleContext::Political,
            "policy" => RoleContext::Policy,
            "writer" => RoleContext::Writer,
            _ => RoleContext::General,
        }
    }

    /// The fixed system instruction for this role.
    pub fn system_instruction(self) -> &'static str {
        match self {
            RoleContext::General => {
                "You are Vantage, a legislative Chief of Staff. Be professional, \
                 strategic, and concise."
            }
            RoleContext::Political => {
                "You are a political strategist. Focus on public perception, \
                 polling impact, and media narrative."
            }
            RoleContext::Policy => {
                "You are a legislative analyst. Focus on statutory interpretation, \
                 fiscal impact, and legal nuance. Use provided document text to \
                 answer questions."
            }
            RoleContext::Writer => {
                "You are a legislative speechwriter. Draft clear, persuasive prose \
                 in the member's voice, ready to deliver."
            }
        }
    }
}

/// Anything that can turn a system instruction and prompt into text.
///
/// Implemented by the Gemini client and by scripted test doubles.
#[async_trait]
pub trait GenerateModel: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl GenerateModel for gemini_client::GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.generate_content(prompt, Some(system_instruction))
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

/// Retry-wrapping gateway over a generation model.
pub struct LlmGateway<M> {
    model: M,
    attempts: u32,
    backoff_base: Duration,
}

impl<M: GenerateModel> LlmGateway<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            attempts: DEFAULT_LLM_ATTEMPTS,
            backoff_base: Duration::from_millis(1000),
        }
    }

    /// Override the attempt budget.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Override the exponential backoff base delay.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Generate an answer, retrying with exponential backoff.
    ///
    /// Returns `None` once the attempt budget is spent.
    pub async fn generate(&self, prompt: &str, role: RoleContext) -> Option<String> {
        let system = role.system_instruction();

        for attempt in 0..self.attempts {
            match self.model.generate(system, prompt).await {
                Ok(text) => return Some(text),
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.attempts,
                        error = %e,
                        "generation attempt failed"
                    );
                    if attempt + 1 < self.attempts {
                        tokio::time::sleep(self.backoff_base * 2u32.pow(attempt)).await;
                    }
                }
            }
        }

        error!(attempts = self.attempts, "assistant unavailable, giving up");
        None
    }
}
