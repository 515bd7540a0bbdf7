//! Identity collaborator trait and a fixed-answer implementation.

use std::time::Duration;

use async_trait::async_trait;

use moodkiosk_core::error::AppError;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::user::UserRole;

/// Answers who is signed in. Session and token verification stay inside
/// the implementation; the engine only consumes the resolved role.
#[async_trait]
pub trait IdentitySource: Send + Sync + 'static {
    /// Resolve the current user's role. `Ok(None)` means nobody is signed in.
    async fn current_role(&self) -> AppResult<Option<UserRole>>;
}

/// Identity source with a fixed answer and an optional lookup latency.
///
/// Used by the CLI simulator and tests in place of a real provider.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    /// The answer every lookup returns.
    answer: AppResult<Option<UserRole>>,
    /// Simulated lookup latency.
    latency: Duration,
}

impl StaticIdentity {
    /// Always resolves to `role`.
    pub fn signed_in(role: UserRole) -> Self {
        Self {
            answer: Ok(Some(role)),
            latency: Duration::ZERO,
        }
    }

    /// Always resolves to "nobody signed in".
    pub fn anonymous() -> Self {
        Self {
            answer: Ok(None),
            latency: Duration::ZERO,
        }
    }

    /// Always fails with the given error.
    pub fn failing(error: AppError) -> Self {
        Self {
            answer: Err(error),
            latency: Duration::ZERO,
        }
    }

    /// Adds a delay before each answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl IdentitySource for StaticIdentity {
    async fn current_role(&self) -> AppResult<Option<UserRole>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.answer.clone()
    }
}
