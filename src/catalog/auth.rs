//! Optional authentication collaborator for the Catalog Service client

/// Supplies credentials to the HTTP client.
///
/// The client either holds one of these or it doesn't; there is no
/// ambient lookup.
pub trait AuthProvider: Send + Sync {
    /// Bearer token to attach, if the user is currently authenticated
    fn bearer_token(&self) -> Option<String>;

    /// Called when the service answers 401
    fn on_unauthorized(&self) {}
}

/// A fixed token taken from configuration
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AuthProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }

    fn on_unauthorized(&self) {
        tracing::warn!("Catalog Service rejected the configured token");
    }
}
