use crate::error::FetchError;
use url::Url;

/// Default cap on downloaded image bodies.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Loads the raw bytes behind an image URL. Called on a worker thread.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<F> ImageFetcher for F
where
    F: Fn(&Url) -> Result<Vec<u8>, FetchError> + Send + Sync,
{
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self(url)
    }
}

/// Reads `file://` URLs from disk and rejects everything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl ImageFetcher for FileFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        read_file(url)
    }
}

fn read_file(url: &Url) -> Result<Vec<u8>, FetchError> {
    if url.scheme() != "file" {
        return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
    }
    let path = url
        .to_file_path()
        .map_err(|()| FetchError::UnsupportedScheme(url.to_string()))?;
    Ok(std::fs::read(path)?)
}

/// Fetches `http`/`https` URLs with a native-tls `ureq` agent; `file` URLs are read from disk.
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: agent(),
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[cfg(feature = "http")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        match url.scheme() {
            "http" | "https" => {
                let response = self
                    .agent
                    .get(url.as_str())
                    .call()
                    .map_err(|e| FetchError::Http(e.to_string()))?;
                response
                    .into_body()
                    .with_config()
                    .limit(self.max_bytes)
                    .read_to_vec()
                    .map_err(|e| FetchError::Http(e.to_string()))
            }
            "file" => read_file(url),
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Agent using the platform TLS stack and root certificates.
#[cfg(feature = "http")]
fn agent() -> ureq::Agent {
    use ureq::tls::RootCerts;
    use ureq::tls::TlsConfig;
    use ureq::tls::TlsProvider;

    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    ureq::Agent::config_builder()
        .tls_config(tls_config)
        .build()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_fetcher_rejects_remote_urls() {
        let url = Url::parse("https://example.com/a.png").unwrap();
        assert!(matches!(
            FileFetcher.fetch(&url),
            Err(FetchError::UnsupportedScheme(s)) if s == "https"
        ));
    }

    #[test]
    fn file_fetcher_reads_local_files() {
        let path = std::env::temp_dir().join(format!("ratatui-markup-{}.bin", std::process::id()));
        std::fs::write(&path, b"abc").unwrap();
        let url = Url::from_file_path(&path).unwrap();
        assert_eq!(FileFetcher.fetch(&url).unwrap(), b"abc");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn closures_are_fetchers() {
        let fetcher = |_: &Url| -> Result<Vec<u8>, FetchError> { Ok(vec![1, 2]) };
        let url = Url::parse("mem://x").unwrap();
        assert_eq!(fetcher.fetch(&url).unwrap(), vec![1, 2]);
    }
}
