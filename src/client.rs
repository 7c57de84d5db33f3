//! Convenience client that signs requests and hands them to a transport.

use {
    crate::{constants::APPLICATION_JSON, RequestSigner, SignedRequest},
    async_trait::async_trait,
    bytes::Bytes,
    chrono::{DateTime, Utc},
    http::method::Method,
    tower::BoxError,
};

/// Carries a signed request over the network.
///
/// The client never embeds a transport; callers supply one (and tests supply
/// a mock). The transport receives a fully-formed [`SignedRequest`] -- URL
/// with the timestamp parameter, `Authorization` header value, content type,
/// and body -- and returns the response body.
#[async_trait]
pub trait Transport {
    /// Perform the HTTP call described by `request` and return the response
    /// body.
    async fn send(&self, request: &SignedRequest) -> Result<Bytes, BoxError>;
}

/// A client that signs each request at send time and delegates transmission
/// to a [`Transport`].
///
/// Every send returns the timestamp that was signed alongside the response,
/// so callers can correlate requests to signing time for diagnostics and
/// retries. Body-style requests are sent as JSON; serialization is up to the
/// caller.
#[derive(Clone, Debug)]
pub struct HmacClient<T> {
    signer: RequestSigner,
    transport: T,
}

impl<T: Transport> HmacClient<T> {
    /// Create a client from a signer and a transport.
    pub fn new(signer: RequestSigner, transport: T) -> Self {
        HmacClient {
            signer,
            transport,
        }
    }

    /// Retrieve the signer.
    #[inline]
    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Send a signed GET request.
    pub async fn get(&self, url: &str) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        self.send_query(Method::GET, url).await
    }

    /// Send a signed DELETE request.
    pub async fn delete(&self, url: &str) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        self.send_query(Method::DELETE, url).await
    }

    /// Send a signed POST request with a JSON body.
    pub async fn post(&self, url: &str, body: Bytes) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        self.send_body(Method::POST, url, body).await
    }

    /// Send a signed PUT request with a JSON body.
    pub async fn put(&self, url: &str, body: Bytes) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        self.send_body(Method::PUT, url, body).await
    }

    /// Send a signed PATCH request with a JSON body.
    pub async fn patch(&self, url: &str, body: Bytes) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        self.send_body(Method::PATCH, url, body).await
    }

    async fn send_query(&self, method: Method, url: &str) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        let request = self.signer.sign(&method, url, None, Bytes::new());
        let timestamp = request.timestamp();
        let response = self.transport.send(&request).await?;
        Ok((timestamp, response))
    }

    async fn send_body(&self, method: Method, url: &str, body: Bytes) -> Result<(DateTime<Utc>, Bytes), BoxError> {
        let request = self.signer.sign(&method, url, Some(APPLICATION_JSON), body);
        let timestamp = request.timestamp();
        let response = self.transport.send(&request).await?;
        Ok((timestamp, response))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{HmacClient, Transport},
        crate::{
            constants::{TEST_PUBLIC_KEY, TEST_SECRET_KEY},
            RequestSigner, SecretKey, SignedRequest,
        },
        async_trait::async_trait,
        bytes::Bytes,
        std::{
            str::FromStr,
            sync::{Arc, Mutex},
        },
        tower::BoxError,
    };

    /// Records every request it is asked to send and echoes the body back.
    #[derive(Clone, Default)]
    struct RecordingTransport {
        requests: Arc<Mutex<Vec<SignedRequest>>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: &SignedRequest) -> Result<Bytes, BoxError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(request.body().clone())
        }
    }

    /// Always reports the connection as refused.
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: &SignedRequest) -> Result<Bytes, BoxError> {
            Err("connection refused".into())
        }
    }

    fn test_client(transport: RecordingTransport) -> HmacClient<RecordingTransport> {
        HmacClient::new(
            RequestSigner::new(TEST_PUBLIC_KEY, SecretKey::from_str(TEST_SECRET_KEY).unwrap()),
            transport,
        )
    }

    #[tokio::test]
    async fn test_query_style_sends() {
        let transport = RecordingTransport::default();
        let client = test_client(transport.clone());

        let (timestamp, response) = client.get("/things?page=1").await.unwrap();
        assert!(response.is_empty());
        let (_, _) = client.delete("/things/42").await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method(), &http::Method::GET);
        assert_eq!(
            requests[0].url(),
            format!("/things?page=1&timestamp={}", timestamp.timestamp_millis())
        );
        assert!(requests[0].authorization().starts_with("hmac 7b95a0d1-"));
        assert!(requests[0].content_type().is_none());
        assert_eq!(requests[1].method(), &http::Method::DELETE);
        assert!(requests[1].url().starts_with("/things/42?timestamp="));
    }

    #[tokio::test]
    async fn test_body_style_sends() {
        let transport = RecordingTransport::default();
        let client = test_client(transport.clone());
        let body = Bytes::from_static(br#"{"a":123,"b":"xyz"}"#);

        let (_, echoed) = client.post("/things", body.clone()).await.unwrap();
        assert_eq!(echoed, body);
        client.put("/things/1", body.clone()).await.unwrap();
        client.patch("/things/1", body.clone()).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        for request in requests.iter() {
            assert_eq!(request.content_type(), Some("application/json"));
            assert_eq!(request.body(), &body);
        }
        assert_eq!(requests[0].method(), &http::Method::POST);
        assert_eq!(requests[1].method(), &http::Method::PUT);
        assert_eq!(requests[2].method(), &http::Method::PATCH);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = HmacClient::new(
            RequestSigner::new(TEST_PUBLIC_KEY, SecretKey::from_str(TEST_SECRET_KEY).unwrap()),
            FailingTransport,
        );
        let e = client.get("/ping").await.unwrap_err();
        assert_eq!(e.to_string(), "connection refused");
        let _ = format!("{:?}", client.signer());
    }
}
