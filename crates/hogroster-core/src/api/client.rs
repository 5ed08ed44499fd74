//! HTTP client for the roster data sources.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{KnownFamilies, RawFamilies, RawStudent};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Prefix for sources read from disk instead of over HTTP.
const FILE_SCHEME: &str = "file://";

/// Everything needed to build a roster.
#[derive(Debug, Clone, Default)]
pub struct RosterSources {
    pub students: Vec<RawStudent>,
    pub families: KnownFamilies,
}

/// Client for the student and family endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RosterClient {
    client: Client,
}

impl RosterClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should
    /// retry), or Err for other errors.
    async fn check_response_for_retry(
        url: &str,
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        let status = response.status();
        if status.is_success() {
            Ok(Some(response))
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, url, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        if let Some(path) = url.strip_prefix(FILE_SCHEME) {
            return read_json_file(Path::new(path)).await;
        }

        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(url, response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited(url.to_string()).into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    // ===== Data Fetching Methods =====

    pub async fn fetch_students(&self, url: &str) -> Result<Vec<RawStudent>> {
        let students: Vec<RawStudent> = self.get(url).await.context("Failed to fetch student roster")?;
        debug!(url = url, count = students.len(), "Fetched students");
        Ok(students)
    }

    pub async fn fetch_families(&self, url: &str) -> Result<RawFamilies> {
        let families: RawFamilies = self.get(url).await.context("Failed to fetch family lists")?;
        debug!(url = url, pure = families.pure.len(), half = families.half.len(), "Fetched families");
        Ok(families)
    }

    /// Fetch the family lists, degrading to empty reference data on failure
    /// so every student resolves to muggle-born.
    pub async fn fetch_known_families(&self, url: &str) -> KnownFamilies {
        match self.fetch_families(url).await {
            Ok(raw) => KnownFamilies::from(raw),
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(url = url, error = %error, "Family lists unavailable, blood status falls back to muggle-born");
                KnownFamilies::default()
            }
        }
    }

    /// Fetch both sources concurrently. Only the roster is required.
    pub async fn fetch_sources(&self, config: &Config) -> Result<RosterSources> {
        let (students, families) = futures::join!(
            self.fetch_students(&config.students_url),
            self.fetch_known_families(&config.families_url)
        );
        let students = students?;

        info!(students = students.len(), families_known = !families.is_empty(), "Data sources loaded");
        Ok(RosterSources { students, families })
    }
}

async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse data file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BloodStatus;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("hogroster-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[tokio::test]
    async fn test_read_json_file() {
        let path = write_temp(
            "students.json",
            r#"[{"fullname": "Cho Chang", "house": "Ravenclaw", "gender": "girl"}]"#,
        );
        let students: Vec<RawStudent> = read_json_file(&path).await.expect("parse students file");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].fullname, "Cho Chang");
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_read_json_file_missing() {
        let path = std::env::temp_dir().join("hogroster-definitely-missing.json");
        let result: Result<RawFamilies> = read_json_file(&path).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_sources_from_files() {
        let students = write_temp(
            "roster.json",
            r#"[{"fullname": "draco MALFOY", "house": "slytherin", "gender": "boy"}]"#,
        );
        let families = write_temp("families.json", r#"{"pure": ["Malfoy"], "half": []}"#);
        let config = Config {
            students_url: format!("{}{}", FILE_SCHEME, students.display()),
            families_url: format!("{}{}", FILE_SCHEME, families.display()),
            ..Config::default()
        };

        let client = RosterClient::new().expect("client");
        let sources = client.fetch_sources(&config).await.expect("sources");
        assert_eq!(sources.students.len(), 1);
        assert_eq!(sources.families.resolve(Some("Malfoy")), BloodStatus::PureBlood);

        let _ = std::fs::remove_file(students);
        let _ = std::fs::remove_file(families);
    }

    #[tokio::test]
    async fn test_missing_families_degrade() {
        let students = write_temp(
            "roster-only.json",
            r#"[{"fullname": "draco malfoy", "house": "slytherin", "gender": "boy"}]"#,
        );
        let config = Config {
            students_url: format!("{}{}", FILE_SCHEME, students.display()),
            families_url: format!("{}/hogroster-no-families.json", FILE_SCHEME),
            ..Config::default()
        };

        let client = RosterClient::new().expect("client");
        let sources = client.fetch_sources(&config).await.expect("roster still loads");
        assert!(sources.families.is_empty());
        assert_eq!(sources.families.resolve(Some("Malfoy")), BloodStatus::MuggleBorn);

        let _ = std::fs::remove_file(students);
    }
}
