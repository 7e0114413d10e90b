use std::fmt::{Debug, Formatter};

use crate::{AppResult, NonEmptyString};

/// Subscription and credential pair required by every management call.
#[derive(Clone, PartialEq, Eq)]
pub struct ManagementContext {
    subscription_id: NonEmptyString,
    access_token: NonEmptyString,
}

impl ManagementContext {
    /// Creates a context from a subscription identifier and a bearer token.
    pub fn new(
        subscription_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            subscription_id: NonEmptyString::for_field("subscription id", subscription_id)?,
            access_token: NonEmptyString::for_field("access token", access_token)?,
        })
    }

    /// Returns the subscription that scopes every request.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.subscription_id.as_str()
    }

    /// Returns the bearer token sent with every request.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }
}

impl Debug for ManagementContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ManagementContext")
            .field("subscription_id", &self.subscription_id.as_str())
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ManagementContext;

    #[test]
    fn debug_output_redacts_token() {
        let context = ManagementContext::new("sub-123", "secret-token");
        let Ok(context) = context else {
            panic!("context should be valid");
        };

        let rendered = format!("{context:?}");
        assert!(rendered.contains("sub-123"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn missing_subscription_is_rejected() {
        assert!(ManagementContext::new(" ", "token").is_err());
    }
}
