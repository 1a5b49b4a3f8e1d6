use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Network-level transport failure.
///
/// Distinguished from HTTP status outcomes: any response the server manages
/// to send, whatever its status, comes back as an [`HttpResponse`]; only a
/// request that never produced a response raises this.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),
}

/// An HTTP response reduced to what the engine needs: status and headers.
///
/// Header names are lowercased.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
        }
    }

    /// Adds a header (name lowercased).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Abstract PUT transport.
///
/// A trait keeps engine logic decoupled from the HTTP client and testable
/// with scripted mocks.
pub trait Transport: Send + Sync {
    /// Issues a PUT of `body` to `url` with the given headers.
    fn put(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport over an existing client (connection pools,
    /// proxies, timeouts configured by the caller).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn put(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        let url = url.to_string();
        let headers = headers.to_vec();
        Box::pin(async move {
            let mut request = self.client.put(&url).body(body);
            for (name, value) in &headers {
                request = request.header(name.as_str(), value.as_str());
            }
            let response = request.send().await?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                })
                .collect();
            Ok(HttpResponse { status, headers })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = HttpResponse::new(308).with_header("Range", "bytes=0-262143");
        assert_eq!(response.header("range"), Some("bytes=0-262143"));
        assert_eq!(response.header("RANGE"), Some("bytes=0-262143"));
        assert_eq!(response.header("content-type"), None);
    }
}
