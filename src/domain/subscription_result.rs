use serde::Deserialize;
use serde::Serialize;

pub const CONFIRMATION_MESSAGE: &str = "¡Listo! Te mantendremos actualizado";

/// What the form gets back. Exactly one of `message`/`error` is set; both are
/// meant to be shown to the visitor verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubscriptionResult {
    pub fn subscribed() -> Self {
        Self {
            success: true,
            message: Some(CONFIRMATION_MESSAGE.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
