//! Archive download with connect and inactivity timeouts

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use url::Url;

use crate::install::error::InstallerError;

const USER_AGENT: &str = concat!("kube-cli-installer/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the metadata and archive requests.
pub fn build_client(connect_timeout: Duration) -> Result<reqwest::Client, InstallerError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| InstallerError::Download {
            step: "creating HTTP client".to_string(),
            message: e.to_string(),
        })
}

/// Send `request`, giving up when no response headers arrive within `wait`.
///
/// The error is the message for an [`InstallerError::Download`].
pub async fn send(
    request: reqwest::RequestBuilder,
    wait: Duration,
) -> Result<reqwest::Response, String> {
    match timeout(wait, request.send()).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "No response received within {} seconds. Check network connection and retry.",
            wait.as_secs()
        )),
    }
}

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// The response status is checked before `dest` is created, so a non-2xx
/// answer leaves nothing on disk. `inactivity` bounds the wait for the
/// response headers and for each chunk.
pub async fn download_archive(
    client: &reqwest::Client,
    url: &Url,
    dest: &Path,
    inactivity: Duration,
) -> Result<u64, InstallerError> {
    let step = format!("downloading {url}");
    let fail = |message: String| InstallerError::Download {
        step: step.clone(),
        message,
    };

    let response = send(client.get(url.clone()), inactivity).await.map_err(fail)?;

    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let total = response.content_length();
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| fail(format!("Failed to create {}: {e}", dest.display())))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    loop {
        let chunk = match timeout(inactivity, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => return Err(fail(e.to_string())),
            Ok(None) => break,
            Err(_) => {
                return Err(fail(format!(
                    "No data received for {} seconds ({downloaded} bytes downloaded). \
                     Check network connection and retry.",
                    inactivity.as_secs()
                )));
            }
        };

        file.write_all(&chunk)
            .await
            .map_err(|e| fail(format!("Failed to write {}: {e}", dest.display())))?;
        downloaded += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| fail(format!("Failed to write {}: {e}", dest.display())))?;

    if let Some(total) = total
        && downloaded != total
    {
        return Err(fail(format!("expected {total} bytes, received {downloaded}")));
    }

    log::debug!("downloaded {downloaded} bytes to {}", dest.display());
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts connections and never writes a byte back.
    async fn silent_server() -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Url::parse(&format!("http://{addr}/kube-cli.tar.gz")).unwrap()
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let url = silent_server().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("kube-cli.tar.gz");
        let client = build_client(Duration::from_secs(1)).unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            download_archive(&client, &url, &dest, Duration::from_secs(1)),
        )
        .await
        .expect("download should give up on its own");

        let err = result.unwrap_err();
        assert!(matches!(err, InstallerError::Download { .. }));
        assert!(err.to_string().starts_with("Failed during: downloading"));
        assert!(err.to_string().contains("No response"));
        assert!(!dest.exists());
    }
}
