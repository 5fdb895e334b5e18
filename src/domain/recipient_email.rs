/// An address the delivery service will accept as `address.email`.
///
/// Only the shape `local@domain` is enforced, with neither side empty. The
/// service does its own deliverability checks, and a stricter rule here
/// would abort a whole run over one unusual but valid address.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct RecipientEmail(String);

impl RecipientEmail {
    pub fn parse(s: String) -> Result<Self, String> {
        match s.rsplit_once('@') {
            Some((local, domain)) if !local.trim().is_empty() && !domain.trim().is_empty() => {
                Ok(Self(s))
            }
            _ => Err(format!("{} is not a valid email address.", s)),
        }
    }
}

impl AsRef<str> for RecipientEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipientEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
