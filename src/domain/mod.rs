mod newsletter_source;
mod subscriber_email;
mod subscription_request;
mod subscription_result;
// allow external `use` statements to skip `subscriber_email` etc
pub use newsletter_source::NewsletterSource;
pub use subscriber_email::SubscriberEmail;
pub use subscription_request::SubscriptionRequest;
pub use subscription_result::SubscriptionResult;
pub use subscription_result::CONFIRMATION_MESSAGE;
