use std::convert::Infallible;
use std::str::FromStr;

/// Gemini models exposed through the `generateContent` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeminiModel {
    #[default]
    Flash,
    Pro,
    Override(String),
}

impl GeminiModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Flash => "gemini-1.5-flash",
            Self::Pro => "gemini-1.5-pro",
            Self::Override(s) => s.as_str(),
        }
    }
}

impl FromStr for GeminiModel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "flash" | "gemini-1.5-flash" => Self::Flash,
            "pro" | "gemini-1.5-pro" => Self::Pro,
            other => Self::Override(other.to_string()),
        })
    }
}
