use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TransportError;

use super::Transport;

/// A mock transport for testing. Returns canned replies from a `HashMap`
/// keyed by request path, populated via the builder pattern. Unknown paths
/// answer `404`. Every requested path is recorded.
pub struct MockTransport {
    replies: HashMap<String, Result<String, (u16, String)>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: HashMap::new(),
        }
    }

    /// Paths requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

pub struct MockTransportBuilder {
    replies: HashMap<String, Result<String, (u16, String)>>,
}

impl MockTransportBuilder {
    pub fn with_body(mut self, path: &str, body: impl Into<String>) -> Self {
        self.replies.insert(path.to_owned(), Ok(body.into()));
        self
    }

    pub fn with_json(self, path: &str, value: serde_json::Value) -> Self {
        self.with_body(path, value.to_string())
    }

    pub fn with_status(mut self, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .insert(path.to_owned(), Err((status, body.into())));
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: self.replies,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_owned());

        match self.replies.get(path) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err((status, body))) => Err(TransportError::Status {
                status: *status,
                body: body.clone(),
            }),
            None => Err(TransportError::Status {
                status: 404,
                body: format!("no route for {path}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_path_is_404_and_recorded() {
        let transport = MockTransport::builder().with_body("/latest/height", "5").build();

        let body = transport.get("/latest/height").await.unwrap();
        assert_eq!(body, "5");

        let err = transport.get("/latest/hash").await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 404, .. }));
        assert_eq!(transport.requests(), vec!["/latest/height", "/latest/hash"]);
    }
}
