use once_cell::sync::Lazy;
use regex::Regex;

/// One `@`, something on either side, and at least one `.` in the domain.
/// Loose on purpose; the provider is the real judge of deliverability.
///
/// U+FEFF is excluded alongside `\s`: the browser's `\s` counts it as
/// whitespace, Unicode `White_Space` does not.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s\x{FEFF}@]+@[^\s\x{FEFF}@]+\.[^\s\x{FEFF}@]+$")
        .expect("static regex must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
/// An email address that has passed the basic syntactic check. Used both by
/// the server (before any provider is called) and by the form controller
/// (before the dispatcher is called).
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        EMAIL_PATTERN
            .is_match(&email)
            .then_some(Self(email.clone()))
            .ok_or(format!("Invalid email: {email:?}"))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
