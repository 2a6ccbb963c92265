use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Variable holding the retry attempt cap.
pub const MAX_ATTEMPTS_VAR: &str = "QUIZ_MAX_ATTEMPTS";
/// Variable holding the fixed delay between rate-limited attempts, in seconds.
pub const RETRY_DELAY_VAR: &str = "QUIZ_RETRY_DELAY_SECS";
/// Variable selecting the generation backend (gemini|deepseek|mock).
pub const CLIENT_VAR: &str = "QUIZ_CLIENT";

/// Load `.env` from the working directory, silently ignoring a missing file.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        load_dotenv();
        env::var(Self::KEY_NAME).ok().filter(|key| !key.trim().is_empty())
    }

    /// Whether a key is available without prompting anybody
    fn has_key() -> bool {
        Self::find_key().is_some()
    }

    /// Append the API key to the .env file unless it is already there
    fn save_to_env_file(api_key: &str) -> std::io::Result<()> {
        if let Ok(content) = std::fs::read_to_string(".env") {
            if content.contains(&format!("{}=", Self::KEY_NAME)) {
                return Ok(());
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(".env")?;
        writeln!(file, "{}={}", Self::KEY_NAME, api_key)
    }
}

/// Read an environment override, keeping `default` when the variable is
/// missing or does not parse.
pub fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(var = name, value = %raw, "Ignoring unparsable configuration value");
                default
            }
        },
        Err(_) => default,
    }
}

/// Read a delay given in whole seconds.
pub fn env_secs_or(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_or(name, default.as_secs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_garbage() {
        env::set_var("STUDENT_QUIZ_TEST_GARBAGE", "three");
        assert_eq!(env_or("STUDENT_QUIZ_TEST_GARBAGE", 3u32), 3);
        env::remove_var("STUDENT_QUIZ_TEST_GARBAGE");
    }

    #[test]
    fn env_or_reads_value() {
        env::set_var("STUDENT_QUIZ_TEST_VALUE", " 7 ");
        assert_eq!(env_or("STUDENT_QUIZ_TEST_VALUE", 3u32), 7);
        env::remove_var("STUDENT_QUIZ_TEST_VALUE");
    }

    #[test]
    fn env_secs_or_defaults_when_unset() {
        assert_eq!(
            env_secs_or("STUDENT_QUIZ_TEST_UNSET", Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }
}
