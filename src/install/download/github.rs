//! GitHub release API interaction

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::fetch;
use crate::install::error::InstallerError;

/// Release metadata; only the tag is needed to build the download URL.
#[derive(Deserialize, Debug)]
pub struct GitHubRelease {
    #[serde(default)]
    pub tag_name: Option<String>,
}

/// Release identifier, e.g. `v1.3.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl GitHubRelease {
    /// Extract the tag; absent or blank is [`InstallerError::MissingTag`].
    pub fn into_tag(self, url: &Url) -> Result<ReleaseTag, InstallerError> {
        match self.tag_name {
            Some(tag) if !tag.trim().is_empty() => Ok(ReleaseTag(tag.trim().to_string())),
            _ => Err(InstallerError::MissingTag {
                url: url.to_string(),
            }),
        }
    }
}

/// Fetch the tag of the latest release, waiting at most `wait` for a response.
pub async fn get_latest_tag(
    client: &reqwest::Client,
    url: &Url,
    wait: Duration,
) -> Result<ReleaseTag, InstallerError> {
    let step = format!("fetching release metadata from {url}");
    let fail = |message: String| InstallerError::Download {
        step: step.clone(),
        message,
    };

    let request = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/vnd.github+json");
    let response = fetch::send(request, wait).await.map_err(fail)?;

    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let release: GitHubRelease = response
        .json()
        .await
        .map_err(|e| fail(format!("invalid release metadata: {e}")))?;
    let tag = release.into_tag(url)?;
    log::info!("Latest release: {tag}");
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://api.github.com/repos/ajdnik/kube-cli/releases/latest").unwrap()
    }

    #[test]
    fn test_tag_from_full_payload() {
        let body = r#"{"url":"x","tag_name":"v1.3.0","name":"v1.3.0","assets":[]}"#;
        let release: GitHubRelease = serde_json::from_str(body).unwrap();
        assert_eq!(release.into_tag(&url()).unwrap(), ReleaseTag::new("v1.3.0"));
    }

    #[test]
    fn test_missing_tag_is_error() {
        let release: GitHubRelease = serde_json::from_str(r#"{"name":"nightly"}"#).unwrap();
        let err = release.into_tag(&url()).unwrap_err();
        assert!(matches!(err, InstallerError::MissingTag { .. }));
    }

    #[test]
    fn test_blank_tag_is_error() {
        let release: GitHubRelease = serde_json::from_str(r#"{"tag_name":"  "}"#).unwrap();
        assert!(release.into_tag(&url()).is_err());
    }

    #[tokio::test]
    async fn test_unresponsive_api_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let url = Url::parse(&format!("http://{addr}/repos/ajdnik/kube-cli/releases/latest"))
            .unwrap();
        let client = fetch::build_client(Duration::from_secs(1)).unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            get_latest_tag(&client, &url, Duration::from_secs(1)),
        )
        .await
        .expect("metadata lookup should give up on its own");

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Failed during: fetching release metadata"));
    }
}
