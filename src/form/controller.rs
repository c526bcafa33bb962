use super::SubscribeClient;
use crate::domain::NewsletterSource;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionRequest;
use crate::domain::SubscriptionResult;
use crate::domain::CONFIRMATION_MESSAGE;
use crate::providers::SubscribeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Succeeded { message: String },
    Failed { error: String },
}

/// One signup form on the page. Hero and call-to-action forms are two
/// instances differing only in `source`.
///
/// State flow: `Idle -> Submitting -> Succeeded | Failed`, and back to `Idle`
/// on the next edit. While `Submitting`, the input and the button are both
/// disabled, so at most one request is ever in flight per form.
#[derive(Debug)]
pub struct FormController {
    source: NewsletterSource,
    email: String,
    state: FormState,
    dialog_open: bool,
}

impl FormController {
    pub fn new(source: NewsletterSource) -> Self {
        Self {
            source,
            email: String::new(),
            state: FormState::Idle,
            dialog_open: false,
        }
    }

    pub fn source(&self) -> NewsletterSource { self.source }

    pub fn email(&self) -> &str { &self.email }

    pub fn state(&self) -> &FormState { &self.state }

    /// The visitor typed into the input. Clears any previous outcome; ignored
    /// while a submission is in flight.
    pub fn edit(
        &mut self,
        value: impl Into<String>,
    ) {
        if self.is_loading() {
            return;
        }
        self.email = value.into();
        self.state = FormState::Idle;
    }

    /// Validate locally and, if the address looks fine, move to `Submitting`
    /// and hand back the request to send. Returns `None` when nothing should
    /// be sent: either a submission is already running, or validation failed
    /// (in which case the form is now `Failed`).
    pub fn begin_submit(&mut self) -> Option<SubscriptionRequest> {
        if self.is_loading() {
            return None;
        }

        let email = self.email.trim();
        if SubscriberEmail::parse(email.to_string()).is_err() {
            self.state = FormState::Failed {
                error: SubscribeError::InvalidEmail.to_string(),
            };
            return None;
        }

        self.state = FormState::Submitting;
        Some(SubscriptionRequest::new(email, self.source))
    }

    /// Apply the server's answer. Only meaningful while `Submitting`.
    pub fn finish(
        &mut self,
        result: SubscriptionResult,
    ) {
        if !self.is_loading() {
            return;
        }

        if result.success {
            self.state = FormState::Succeeded {
                message: result
                    .message
                    .unwrap_or_else(|| CONFIRMATION_MESSAGE.to_string()),
            };
            self.email.clear();
            self.dialog_open = true;
        } else {
            let error = result.error.unwrap_or_else(|| {
                SubscribeError::Unexpected(anyhow::anyhow!("failure without a message"))
                    .to_string()
            });
            self.state = FormState::Failed { error };
        }
    }

    /// `begin_submit`, send through `client`, then `finish`
    pub async fn submit<C>(
        &mut self,
        client: &C,
    ) where
        C: SubscribeClient + ?Sized,
    {
        let Some(request) = self.begin_submit() else {
            return;
        };
        let result = client.subscribe(&request).await;
        self.finish(result);
    }

    pub fn is_loading(&self) -> bool { self.state == FormState::Submitting }

    /// An empty input still submits; it fails local validation like any other
    /// bad address
    pub fn is_submit_disabled(&self) -> bool { self.is_loading() }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.state {
            FormState::Succeeded { message } => Some(message),
            _ => None,
        }
    }

    pub fn dialog_open(&self) -> bool { self.dialog_open }

    /// Called once the success dialog has been dismissed, by whatever means
    pub fn close_dialog(&mut self) { self.dialog_open = false; }
}
