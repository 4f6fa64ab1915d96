//! Fetching grammars and syntax dumps.
//!
//! Locations starting with `http://` or `https://` are fetched with ureq;
//! anything else (optionally prefixed `file://`) is read from disk. Fetches
//! are blocking and run on tokio's blocking pool.

use super::config::RetryConfig;
use fenceline_core::FencelineError;
use std::sync::Arc;
use std::time::Duration;
use ureq::Agent;

/// Largest resource accepted from the network.
const MAX_RESOURCE_BYTES: u64 = 64 * 1024 * 1024;

/// Something that can produce the bytes behind a location.
pub trait ResourceSource: Send + Sync {
    /// Fetches `location` once.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FencelineError>;
}

/// HTTP(S) and filesystem source.
pub struct HttpSource {
    agent: Agent,
}

impl HttpSource {
    /// Creates a source whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }

    fn fetch_http(&self, location: &str) -> Result<Vec<u8>, FencelineError> {
        let fetch_error = |message: String| FencelineError::ResourceFetch {
            location: location.to_string(),
            attempts: 1,
            message,
        };

        let mut response = self
            .agent
            .get(location)
            .call()
            .map_err(|err| fetch_error(err.to_string()))?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_RESOURCE_BYTES)
            .read_to_vec()
            .map_err(|err| fetch_error(err.to_string()))
    }
}

impl ResourceSource for HttpSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FencelineError> {
        if is_remote(location) {
            self.fetch_http(location)
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Ok(std::fs::read(path)?)
        }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("https://") || location.starts_with("http://")
}

/// Fetches `location`, retrying with exponential backoff.
///
/// There is no overall deadline beyond `attempts` times the per-request
/// timeout plus the backoff delays.
pub async fn fetch_with_retry(
    source: &Arc<dyn ResourceSource>,
    location: &str,
    retry: &RetryConfig,
) -> Result<Vec<u8>, FencelineError> {
    let attempts = retry.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        let task_source = Arc::clone(source);
        let task_location = location.to_string();
        let outcome = tokio::task::spawn_blocking(move || task_source.fetch(&task_location))
            .await
            .map_err(|err| {
                FencelineError::InternalError(format!("fetch task for {} failed: {}", location, err))
            })?;

        match outcome {
            Ok(bytes) => {
                log::info!("Fetched {} ({} bytes)", location, bytes.len());
                return Ok(bytes);
            }
            Err(err) => {
                log::warn!(
                    "Fetching {} failed (attempt {}/{}): {}",
                    location,
                    attempt,
                    attempts,
                    err
                );
                last_error = match err {
                    FencelineError::ResourceFetch { message, .. } => message,
                    other => other.to_string(),
                };
                if attempt < attempts {
                    tokio::time::sleep(retry.backoff(attempt)).await;
                }
            }
        }
    }

    Err(FencelineError::ResourceFetch {
        location: location.to_string(),
        attempts,
        message: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl ResourceSource for Flaky {
        fn fetch(&self, location: &str) -> Result<Vec<u8>, FencelineError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(FencelineError::ResourceFetch {
                    location: location.to_string(),
                    attempts: 1,
                    message: format!("failure {}", call + 1),
                })
            } else {
                Ok(b"ok".to_vec())
            }
        }
    }

    fn quick_retry(attempts: u32) -> RetryConfig {
        RetryConfig {
            attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let flaky = Arc::new(Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let source: Arc<dyn ResourceSource> = flaky.clone();
        let bytes = fetch_with_retry(&source, "mem://x", &quick_retry(3))
            .await
            .unwrap();
        assert_eq!(bytes, b"ok");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let flaky = Arc::new(Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
        });
        let source: Arc<dyn ResourceSource> = flaky.clone();
        let err = fetch_with_retry(&source, "mem://x", &quick_retry(2))
            .await
            .unwrap_err();
        match err {
            FencelineError::ResourceFetch {
                location,
                attempts,
                message,
            } => {
                assert_eq!(location, "mem://x");
                assert_eq!(attempts, 2);
                assert_eq!(message, "failure 2");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reads_local_files() {
        let path = std::env::temp_dir().join(format!(
            "fenceline-source-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "grammar").unwrap();

        let source: Arc<dyn ResourceSource> =
            Arc::new(HttpSource::new(Duration::from_secs(1)));
        let location = format!("file://{}", path.display());
        let bytes = fetch_with_retry(&source, &location, &quick_retry(1))
            .await
            .unwrap();
        assert_eq!(bytes, b"grammar");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn classifies_remote_locations() {
        assert!(is_remote("https://example.com/a.yml"));
        assert!(is_remote("http://example.com/a.yml"));
        assert!(!is_remote("/tmp/a.yml"));
        assert!(!is_remote("file:///tmp/a.yml"));
    }
}
