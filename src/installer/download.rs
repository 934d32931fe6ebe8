use crate::constants::PARTIAL_DOWNLOAD_SUFFIX;
use crate::core::UpdaterError;
use crate::source::http;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Downloads `url` into `destination`, returning the number of bytes written.
///
/// The body is streamed into `<destination>.part` and renamed into place only
/// after the last chunk is flushed, so an interrupted download never leaves a
/// file that later runs would treat as a cached archive.
///
/// # Errors
///
/// - [`UpdaterError::Network`] / [`UpdaterError::Timeout`] for request failures
/// - [`UpdaterError::Filesystem`] if the file cannot be written or renamed
pub async fn download_archive(
    client: &Client,
    url: &str,
    destination: &Path,
    timeout: Duration,
) -> Result<u64, UpdaterError> {
    let partial = partial_path(destination);
    let result = write_body(client, url, &partial, timeout).await;

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                debug!(error = %cleanup, "Could not remove {}", partial.display());
            }
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, destination)
        .await
        .map_err(|e| UpdaterError::io("move downloaded archive to", destination, e))?;

    info!("Downloaded {bytes} bytes to {}", destination.display());
    Ok(bytes)
}

async fn write_body(
    client: &Client,
    url: &str,
    partial: &Path,
    timeout: Duration,
) -> Result<u64, UpdaterError> {
    let mut response = http::get(client, url, timeout).await?;

    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| UpdaterError::io("create", partial, e))?;

    let mut written = 0u64;
    while let Some(chunk) =
        response.chunk().await.map_err(|e| UpdaterError::from_request(url, timeout, e))?
    {
        file.write_all(&chunk).await.map_err(|e| UpdaterError::io("write", partial, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| UpdaterError::io("flush", partial, e))?;
    file.sync_all().await.map_err(|e| UpdaterError::io("sync", partial, e))?;
    Ok(written)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(PARTIAL_DOWNLOAD_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::http::build_client;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_full_body() {
        let server = MockServer::start().await;
        let body = vec![7u8; 64 * 1024];
        Mock::given(method("GET"))
            .and(path("/downloads/elvui-11.07.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("elvui-11.07.zip");
        let client = build_client(Duration::from_secs(5)).unwrap();

        let written = download_archive(
            &client,
            &format!("{}/downloads/elvui-11.07.zip", server.uri()),
            &destination,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&destination).unwrap(), body);
        assert!(!partial_path(&destination).exists());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_nothing_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("elvui-11.07.zip");
        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = download_archive(&client, &server.uri(), &destination, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, UpdaterError::Network { .. }));
        assert!(!destination.exists());
        assert!(!partial_path(&destination).exists());
    }

    /// Serves one response whose body arrives as `chunks`, each after `gap`.
    /// `declared_len` may exceed the bytes sent to simulate a stalled transfer.
    async fn trickle_server(chunks: Vec<Vec<u8>>, gap: Duration, declared_len: usize) -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {declared_len}\r\nConnection: close\r\n\r\n"
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for chunk in chunks {
                tokio::time::sleep(gap).await;
                socket.write_all(&chunk).await.unwrap();
                socket.flush().await.unwrap();
            }
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        format!("http://{addr}/downloads/elvui-11.07.zip")
    }

    #[tokio::test]
    async fn test_slow_transfer_longer_than_timeout_succeeds() {
        let chunks = vec![vec![1u8; 1024]; 5];
        let url = trickle_server(chunks, Duration::from_millis(150), 5 * 1024).await;

        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("elvui-11.07.zip");
        // Whole transfer takes ~750ms; no single gap reaches the timeout.
        let timeout = Duration::from_millis(500);
        let client = build_client(timeout).unwrap();

        let written = download_archive(&client, &url, &destination, timeout).await.unwrap();
        assert_eq!(written, 5 * 1024);
        assert_eq!(std::fs::read(&destination).unwrap().len(), 5 * 1024);
    }

    #[tokio::test]
    async fn test_stalled_transfer_times_out() {
        let url = trickle_server(vec![vec![1u8; 1024]], Duration::from_millis(10), 4 * 1024).await;

        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("elvui-11.07.zip");
        let timeout = Duration::from_millis(300);
        let client = build_client(timeout).unwrap();

        let err = download_archive(&client, &url, &destination, timeout).await.unwrap_err();
        assert!(matches!(err, UpdaterError::Timeout { .. }), "got {err:?}");
        assert!(!destination.exists());
        assert!(!partial_path(&destination).exists());
    }

    #[test]
    fn test_partial_path() {
        let partial = partial_path(Path::new("/tmp/elvui-11.07.zip"));
        assert_eq!(partial, PathBuf::from("/tmp/elvui-11.07.zip.part"));
    }
}
