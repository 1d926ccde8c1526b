use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, time::Duration};

/// Tunables for a [`Controller`](crate::conversation::Controller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Expiry is reported as a transport failure.
    #[serde(
        rename = "submit_timeout_ms",
        default = "default_submit_timeout",
        with = "duration_ms"
    )]
    pub submit_timeout: Duration,

    /// Return malformed-path edits as errors instead of dropping them.
    #[serde(default = "default_strict_paths")]
    pub strict_paths: bool,

    /// Content of the user message appended on submission.
    #[serde(default = "default_submitted_content")]
    pub submitted_content: String,

    /// Acknowledgment used when the active schema has no endpoint to call.
    #[serde(default = "default_completed_content")]
    pub completed_content: String,
}

fn default_submit_timeout() -> Duration {
    Duration::from_millis(30_000)
}

fn default_strict_paths() -> bool {
    cfg!(debug_assertions)
}

fn default_submitted_content() -> String {
    "Form submitted".to_string()
}

fn default_completed_content() -> String {
    "Submission complete".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            submit_timeout: default_submit_timeout(),
            strict_paths: default_strict_paths(),
            submitted_content: default_submitted_content(),
            completed_content: default_completed_content(),
        }
    }
}

impl ControllerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn with_strict_paths(mut self, strict: bool) -> Self {
        self.strict_paths = strict;
        self
    }
}

pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ControllerConfig::from_json(r#"{"submit_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.submit_timeout, Duration::from_millis(250));
        assert_eq!(config.submitted_content, "Form submitted");
        assert_eq!(config.strict_paths, cfg!(debug_assertions));
    }

    #[test]
    fn round_trips_through_json() {
        let config = ControllerConfig::default().with_strict_paths(false);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"submit_timeout_ms\":30000"));
        assert_eq!(ControllerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ControllerConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
