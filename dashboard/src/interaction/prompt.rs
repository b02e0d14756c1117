use async_trait::async_trait;
use tracing::info;

/// Asks the user to confirm a consequential action
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Prompt that always gives the same answer (headless runs, tests)
pub struct FixedAnswer(pub bool);

#[async_trait]
impl ConfirmPrompt for FixedAnswer {
    async fn confirm(&self, message: &str) -> bool {
        info!("Auto-answering '{}' with {}", message, self.0);
        self.0
    }
}
