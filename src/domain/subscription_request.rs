use serde::Deserialize;
use serde::Serialize;

use super::NewsletterSource;

/// Raw signup as submitted by a form. The email is deliberately left as a
/// `String`: it is only parsed into a `SubscriberEmail` at the dispatcher
/// boundary, so that a bad address becomes a normal result instead of an
/// extractor rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub email: String,
    pub source: NewsletterSource,
}

impl SubscriptionRequest {
    pub fn new(
        email: impl Into<String>,
        source: NewsletterSource,
    ) -> Self {
        Self {
            email: email.into(),
            source,
        }
    }
}
