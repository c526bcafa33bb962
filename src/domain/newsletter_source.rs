use serde::Deserialize;
use serde::Serialize;

/// Which form on the landing page produced the signup. Stored alongside the
/// email so the list can be segmented later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsletterSource {
    // the long tags were written to the sheet by earlier versions of the page;
    // keep accepting them so old cached pages still subscribe
    #[serde(rename = "Hero", alias = "CheMango Website Hero")]
    Hero,
    #[serde(rename = "CTA", alias = "CheMango Website CTA")]
    Cta,
}

impl NewsletterSource {
    /// The tag as stored by the providers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::Cta => "CTA",
        }
    }
}

impl std::fmt::Display for NewsletterSource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
