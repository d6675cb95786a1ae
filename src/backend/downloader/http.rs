use super::progress::ProgressTracker;
use crate::backend::config::FetchConfig;
use crate::utils::{FetchError, Result};
use futures_util::StreamExt;
use log::debug;
use reqwest::{Client, ClientBuilder};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// What a finished download wrote to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub bytes: u64,
    pub sha256: String,
}

/// Fetches one archive to a local path.
pub trait ArchiveDownloader {
    fn download(
        &self,
        url: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<DownloadReport>> + Send;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Self::with_builder(client_builder(config))
    }

    fn with_builder(builder: ClientBuilder) -> Result<Self> {
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<DownloadReport> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        debug!("Downloading {url} to {destination:?}");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::download(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let mut tracker = ProgressTracker::new(name);
        if let Some(size) = response.content_length() {
            tracker.set_total(size);
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| FetchError::download(format!("cannot create {destination:?}: {e}")))?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let mut hasher = Sha256::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::download(format!("cannot write {destination:?}: {e}")))?;
            downloaded += chunk.len() as u64;
            hasher.update(&chunk);
            tracker.update(downloaded);
        }

        file.flush()
            .await
            .map_err(|e| FetchError::download(format!("cannot write {destination:?}: {e}")))?;
        drop(file);

        tracker.complete();

        Ok(DownloadReport {
            bytes: downloaded,
            sha256: hex::encode(hasher.finalize()),
        })
    }
}

fn client_builder(config: &FetchConfig) -> ClientBuilder {
    let builder = Client::builder()
        .use_rustls_tls()
        .user_agent(config.user_agent.as_str());
    match config.timeout() {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<DownloadReport>> + Send {
        self.fetch(url, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::DEFAULT_USER_AGENT;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve a single HTTP response and hand back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static [u8],
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/get", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            // The client may hang up early on error statuses
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body).await;
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    // Loopback servers must not be routed through a proxy from the environment
    fn local_downloader(agent: &str) -> HttpDownloader {
        let config = FetchConfig {
            user_agent: agent.to_string(),
            ..FetchConfig::default()
        };
        HttpDownloader::with_builder(client_builder(&config).no_proxy()).unwrap()
    }

    #[tokio::test]
    async fn streams_body_to_disk_with_user_agent() {
        let (base, server) = serve_once("200 OK", b"archive-bytes").await;
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested").join("Rock035_1K.zip");

        let downloader = local_downloader("texture-test/1.0");
        let url = format!("{base}?file=Rock035_1K-PNG.zip");
        let report = downloader.download(&url, &destination).await.unwrap();

        assert_eq!(report.bytes, 13);
        assert_eq!(
            report.sha256,
            hex::encode(Sha256::digest(b"archive-bytes"))
        );
        assert_eq!(std::fs::read(&destination).unwrap(), b"archive-bytes");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /get?file=rock035_1k-png.zip "));
        assert!(request.contains("user-agent: texture-test/1.0"));
    }

    #[tokio::test]
    async fn error_status_is_a_download_failure() {
        let (base, server) = serve_once("404 Not Found", b"missing").await;
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("Nope_1K.zip");

        let downloader = local_downloader(DEFAULT_USER_AGENT);
        let err = downloader
            .download(&format!("{base}?file=Nope_1K-PNG.zip"), &destination)
            .await
            .unwrap_err();

        assert!(err.is_download());
        assert!(err.to_string().contains("404"));
        assert!(!destination.exists());
        server.await.unwrap();
    }

    #[test]
    fn builds_from_config_with_timeout() {
        let config = FetchConfig {
            timeout_secs: Some(5),
            ..FetchConfig::default()
        };
        assert!(HttpDownloader::new(&config).is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_download_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let downloader = local_downloader(DEFAULT_USER_AGENT);
        let err = downloader
            .download(&format!("http://{addr}/get?file=X_1K-PNG.zip"), &dir.path().join("X_1K.zip"))
            .await
            .unwrap_err();

        assert!(err.is_download());
    }
}
