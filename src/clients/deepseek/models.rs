use std::convert::Infallible;
use std::str::FromStr;

/// DeepSeek chat models usable for quiz generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeepSeekModel {
    #[default]
    Chat,
    Reasoner,
    Override(String),
}

impl DeepSeekModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Chat => "deepseek-chat",
            Self::Reasoner => "deepseek-reasoner",
            Self::Override(s) => s.as_str(),
        }
    }
}

impl FromStr for DeepSeekModel {
    type Err = Infallible;

    /// Known ids map to their variant, anything else is passed through.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "deepseek-chat" | "chat" => Self::Chat,
            "deepseek-reasoner" | "reasoner" => Self::Reasoner,
            other => Self::Override(other.to_string()),
        })
    }
}
