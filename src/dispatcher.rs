use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionRequest;
use crate::domain::SubscriptionResult;
use crate::providers::SubscribeError;
use crate::providers::SubscriptionProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    GoogleSheets,
    Loops,
}

/// Which provider(s) a request is written to. Resolved from `ProviderConfig`
/// on every request and passed in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Exactly one provider; its outcome is the request's outcome
    Single(ProviderKind),
    /// Google Sheets is authoritative. If `mirror` is set, Loops receives a
    /// best-effort copy afterwards, whose outcome is logged and dropped.
    DualWrite { mirror: bool },
}

/// The adapters available to a single request
#[derive(Clone, Copy)]
pub struct Providers<'a> {
    pub google_sheets: &'a dyn SubscriptionProvider,
    pub loops: &'a dyn SubscriptionProvider,
}

impl<'a> Providers<'a> {
    fn get(
        &self,
        kind: ProviderKind,
    ) -> &'a dyn SubscriptionProvider {
        match kind {
            ProviderKind::GoogleSheets => self.google_sheets,
            ProviderKind::Loops => self.loops,
        }
    }
}

/// Like `try_dispatch`, but every failure is folded into the normalized
/// result; nothing escapes to the caller as an error.
pub async fn dispatch(
    mode: DeliveryMode,
    providers: Providers<'_>,
    request: SubscriptionRequest,
) -> SubscriptionResult {
    try_dispatch(mode, providers, request).await.into()
}

/// Validate the email, then write it to whichever provider(s) `mode` names.
///
/// The returned outcome is always that of the primary write. In dual-write
/// mode the mirror is awaited before returning, but its failure never
/// changes the outcome.
///
/// No deduplication: dispatching the same email twice writes it twice.
#[tracing::instrument(
    name = "Dispatching newsletter subscription",
    skip(providers, request),
    fields(
        subscriber_email = %request.email,
        source = %request.source,
    )
)]
pub async fn try_dispatch(
    mode: DeliveryMode,
    providers: Providers<'_>,
    request: SubscriptionRequest,
) -> Result<(), SubscribeError> {
    let email = SubscriberEmail::parse(request.email).map_err(|e| {
        tracing::info!("rejecting signup: {e}");
        SubscribeError::InvalidEmail
    })?;

    match mode {
        DeliveryMode::Single(kind) => providers.get(kind).subscribe(&email, request.source).await,
        DeliveryMode::DualWrite { mirror } => {
            let outcome = providers
                .google_sheets
                .subscribe(&email, request.source)
                .await;

            if mirror {
                if let Err(e) = providers.loops.subscribe(&email, request.source).await {
                    tracing::warn!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "mirror write to {} failed; ignoring",
                        providers.loops.name()
                    );
                }
            }

            outcome
        }
    }
}
