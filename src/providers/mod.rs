mod error;
mod google_sheets;
mod loops;

use async_trait::async_trait;
pub use error::classify;
pub use error::SubscribeError;
pub use google_sheets::GoogleSheetsClient;
pub use google_sheets::ServiceAccount;
pub use loops::LoopsClient;

use crate::domain::NewsletterSource;
use crate::domain::SubscriberEmail;

/// Status written alongside every signup
pub const SUBSCRIBED: &str = "subscribed";

/// One external system that can hold the subscriber list.
///
/// Implementations make exactly one remote attempt per call and classify any
/// failure into a `SubscribeError`; they never retry.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn subscribe(
        &self,
        email: &SubscriberEmail,
        source: NewsletterSource,
    ) -> Result<(), SubscribeError>;
}
