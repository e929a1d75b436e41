use async_trait::async_trait;

use crate::engine::EngineError;

/// Supplies the bearer token for backend calls. Read at call time, so a
/// session that signs out between calls is noticed on the next request.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn access_token(&self) -> Result<String, EngineError>;
}

/// Fixed token, e.g. from `BOOKDESK_TOKEN`. `None` or blank means signed out.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl SessionSource for StaticToken {
    async fn access_token(&self) -> Result<String, EngineError> {
        self.token.clone().ok_or(EngineError::AuthMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_token_is_missing() {
        let src = StaticToken::new(Some("   ".into()));
        assert_eq!(src.access_token().await, Err(EngineError::AuthMissing));
        let src = StaticToken::new(None);
        assert_eq!(src.access_token().await, Err(EngineError::AuthMissing));
    }

    #[tokio::test]
    async fn token_is_returned() {
        let src = StaticToken::new(Some("abc".into()));
        assert_eq!(src.access_token().await.unwrap(), "abc");
    }
}
