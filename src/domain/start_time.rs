use chrono::DateTime;

/// chrono's `%z` has no colon between offset hours and minutes, unlike the
/// `YYYY-MM-DDTHH:MM:SS±HH:MM` layout the delivery service requires.
const COLONLESS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Scheduled send time, kept as the exact string the service will receive.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct StartTime(String);

impl StartTime {
    pub fn parse(s: String) -> Result<Self, String> {
        if is_expected_format(&s) {
            Ok(Self(s))
        } else {
            Err(format!("Unexpected date/time string value {}", s))
        }
    }
}

impl AsRef<str> for StartTime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StartTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Syntactic check only: the time is not required to be in the future and the
/// offset is not required to name a real timezone.
pub fn is_expected_format(timestamp: &str) -> bool {
    let len = timestamp.len();
    if len < 3 || !timestamp.is_char_boundary(len - 3) || !timestamp.is_char_boundary(len - 2) {
        return false;
    }
    if &timestamp[len - 3..len - 2] != ":" {
        return false;
    }
    let colonless = format!("{}{}", &timestamp[..len - 3], &timestamp[len - 2..]);
    DateTime::parse_from_str(&colonless, COLONLESS_FORMAT).is_ok()
}
