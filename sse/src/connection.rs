use crate::message::ConnectionOutcome;
use log::*;
use reqwest::header::ACCEPT;
use reqwest::{Response, StatusCode};
use std::collections::HashMap;

const EVENT_STREAM: &str = "text/event-stream";

/// Opens the event stream: one GET request, no retries.
pub(crate) struct Connection {
    url: String,
    http: reqwest::Client,
}

impl Connection {
    pub(crate) fn new(url: String, http: reqwest::Client) -> Self {
        Self { url, http }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// Sends the request with `params` merged into the query string.
    ///
    /// Returns the open response only for `200 OK`; every other result maps to
    /// the failure outcome the caller should report.
    pub(crate) async fn open(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Response, ConnectionOutcome> {
        let request = self
            .http
            .get(&self.url)
            .query(params)
            .header(ACCEPT, EVENT_STREAM)
            .build()
            .map_err(|e| {
                error!("Failed to build SSE request for {}: {e}", self.url);
                ConnectionOutcome::ClientCreationFailed
            })?;

        debug!("Connecting to {}", request.url());

        let response = self.http.execute(request).await.map_err(|e| {
            error!("SSE request to {} failed: {e}", self.url);
            ConnectionOutcome::RequestFailed
        })?;

        if response.status() != StatusCode::OK {
            warn!(
                "SSE endpoint {} answered with status {}",
                self.url,
                response.status()
            );
            return Err(ConnectionOutcome::ConnectFailed);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_open_sends_accept_header_and_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/stream")
            .match_header("accept", EVENT_STREAM)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("channels".into(), "a,b".into()),
                Matcher::UrlEncoded("v".into(), "1.1".into()),
            ]))
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let connection = Connection::new(format!("{}/stream", server.url()), reqwest::Client::new());
        let response = connection
            .open(&params(&[("channels", "a,b"), ("v", "1.1")]))
            .await;

        assert!(response.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_open_non_ok_status_is_connect_failed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/stream")
            .with_status(503)
            .create_async()
            .await;

        let connection = Connection::new(format!("{}/stream", server.url()), reqwest::Client::new());

        assert_eq!(
            connection.open(&HashMap::new()).await.unwrap_err(),
            ConnectionOutcome::ConnectFailed
        );
    }

    #[tokio::test]
    async fn test_open_no_content_is_connect_failed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/stream")
            .with_status(204)
            .create_async()
            .await;

        let connection = Connection::new(format!("{}/stream", server.url()), reqwest::Client::new());

        assert_eq!(
            connection.open(&HashMap::new()).await.unwrap_err(),
            ConnectionOutcome::ConnectFailed
        );
    }

    #[tokio::test]
    async fn test_open_invalid_url_is_client_creation_failed() {
        let connection = Connection::new("not a url".to_string(), reqwest::Client::new());

        assert_eq!(
            connection.open(&HashMap::new()).await.unwrap_err(),
            ConnectionOutcome::ClientCreationFailed
        );
    }

    #[tokio::test]
    async fn test_open_unreachable_host_is_request_failed() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let connection = Connection::new(format!("http://{addr}/stream"), reqwest::Client::new());

        assert_eq!(
            connection.open(&HashMap::new()).await.unwrap_err(),
            ConnectionOutcome::RequestFailed
        );
    }
}
