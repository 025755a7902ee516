//! HTTP transport against a node's `/v1` REST API.

use async_trait::async_trait;
use pocket_relay_core::{to_transport_bytes, Address, Relay};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::transport::{NodeDirectory, RelayResponse, ServiceNode, Transport};

const RELAY_PATH: &str = "client/relay";
const HEIGHT_PATH: &str = "query/height";
const NODE_PATH: &str = "query/node";

/// Transport speaking JSON over HTTP to a single node.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: api_base(&config.endpoint),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<(StatusCode, String)> {
        let response = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(path, status = status.as_u16(), "node responded");
        Ok((status, text))
    }
}

fn api_base(endpoint: &str) -> String {
    format!("{}/v1", endpoint.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    error: Option<RejectionError>,
    dispatch: Option<Dispatch>,
}

#[derive(Debug, Deserialize)]
struct RejectionError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Dispatch {
    session: Option<DispatchSession>,
}

#[derive(Debug, Deserialize)]
struct DispatchSession {
    header: Option<SessionHeader>,
}

#[derive(Debug, Deserialize)]
struct SessionHeader {
    session_height: Option<i64>,
}

/// Extract the error message and corrected session height from a 400 body.
fn parse_rejection(body: &str) -> Result<(Option<String>, Option<i64>)> {
    let parsed: RejectionBody = serde_json::from_str(body)
        .map_err(|e| RelayError::Transport(format!("unparseable rejection: {e}")))?;
    let message = parsed.error.and_then(|e| e.message);
    let height = parsed
        .dispatch
        .and_then(|d| d.session)
        .and_then(|s| s.header)
        .and_then(|h| h.session_height);
    Ok((message, height))
}

#[derive(Debug, Deserialize)]
struct HeightBody {
    height: i64,
}

#[derive(Serialize)]
struct NodeQuery {
    address: String,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit_relay(&self, relay: &Relay) -> Result<RelayResponse> {
        let body = to_transport_bytes(relay)?;
        let (status, text) = self.post(RELAY_PATH, body).await?;

        let (error_message, corrected_height) = if status == StatusCode::BAD_REQUEST {
            parse_rejection(&text)?
        } else {
            (None, None)
        };

        Ok(RelayResponse {
            status: status.as_u16(),
            body: text,
            error_message,
            corrected_height,
        })
    }

    async fn query_height(&self) -> Result<i64> {
        let (status, text) = self.post(HEIGHT_PATH, b"{}".to_vec()).await?;
        if !status.is_success() {
            return Err(RelayError::Transport(format!(
                "height query failed with status {status}: {text}"
            )));
        }
        let parsed: HeightBody = serde_json::from_str(&text)
            .map_err(|e| RelayError::Transport(format!("unparseable height: {e}")))?;
        Ok(parsed.height)
    }
}

#[async_trait]
impl NodeDirectory for HttpTransport {
    async fn lookup_service_node(&self, address: &Address) -> Result<Option<ServiceNode>> {
        let query = NodeQuery {
            address: address.to_hex(),
        };
        let body = to_transport_bytes(&query)?;
        let (status, text) = self.post(NODE_PATH, body).await?;
        if status != StatusCode::OK {
            debug!(%address, status = status.as_u16(), "node lookup found nothing");
            return Ok(None);
        }
        let node = serde_json::from_str(&text)
            .map_err(|e| RelayError::Transport(format!("unparseable node: {e}")))?;
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base() {
        assert_eq!(api_base("http://localhost:8081"), "http://localhost:8081/v1");
        assert_eq!(api_base("https://node.example/"), "https://node.example/v1");
    }

    #[test]
    fn test_parse_rejection_with_dispatch() {
        let body = r#"{
            "error": {"code": 60, "codespace": "pocketcore", "message": "the block height passed is invalid for the session"},
            "dispatch": {
                "block_height": 120,
                "session": {
                    "header": {"app_public_key": "aa", "chain": "0021", "session_height": 97},
                    "key": "k",
                    "nodes": []
                }
            }
        }"#;
        let (message, height) = parse_rejection(body).unwrap();
        assert_eq!(
            message.as_deref(),
            Some("the block height passed is invalid for the session")
        );
        assert_eq!(height, Some(97));
    }

    #[test]
    fn test_parse_rejection_without_dispatch() {
        let body = r#"{"error": {"code": 4, "message": "invalid signature"}}"#;
        let (message, height) = parse_rejection(body).unwrap();
        assert_eq!(message.as_deref(), Some("invalid signature"));
        assert_eq!(height, None);
    }

    #[test]
    fn test_parse_rejection_garbage() {
        assert!(matches!(
            parse_rejection("<html>bad gateway</html>"),
            Err(RelayError::Transport(_))
        ));
    }

    #[test]
    fn test_node_body_ignores_extra_fields() {
        let body = r#"{"address":"ab","public_key":"cd","jailed":false,"chains":["0021"]}"#;
        let node: ServiceNode = serde_json::from_str(body).unwrap();
        assert_eq!(node.public_key, "cd");
    }

    #[test]
    fn test_transport_builds_from_config() {
        let config = RelayConfig::default();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.url(RELAY_PATH), "http://localhost:8081/v1/client/relay");
    }

    mod socket {
        use super::*;
        use crate::{KeyRing, Relayer, SessionState};
        use parking_lot::Mutex;
        use pocket_relay_core::Keypair;
        use std::io::{BufRead, BufReader, Read, Write};
        use std::net::{SocketAddr, TcpListener, TcpStream};
        use std::sync::Arc;
        use std::time::Duration;

        type Seen = Arc<Mutex<Vec<(String, String)>>>;

        /// A one-node HTTP stub answering each path with a fixed status and body.
        /// Unknown paths get a 404. Every request's path and body is recorded.
        fn serve(routes: Vec<(&'static str, u16, String)>) -> (SocketAddr, Seen) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let seen: Seen = Arc::default();
            let record = Arc::clone(&seen);
            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    let (path, body) = read_request(&stream);
                    let (status, reply) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|(_, status, body)| (*status, body.clone()))
                        .unwrap_or((404, String::new()));
                    record.lock().push((path, body));
                    write_response(stream, status, &reply);
                }
            });
            (addr, seen)
        }

        fn read_request(stream: &TcpStream) -> (String, String) {
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let path = line.split_whitespace().nth(1).unwrap_or_default().to_string();

            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            (path, String::from_utf8(body).unwrap())
        }

        fn write_response(mut stream: TcpStream, status: u16, body: &str) {
            let head = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body.as_bytes()).unwrap();
        }

        fn config_for(addr: SocketAddr) -> RelayConfig {
            RelayConfig {
                endpoint: format!("http://{addr}"),
                request_timeout: Duration::from_secs(5),
                ..RelayConfig::default()
            }
        }

        fn servicer() -> Keypair {
            Keypair::from_seed(&[0x02; 32])
        }

        fn node_route() -> (&'static str, u16, String) {
            let node = Keypair::from_seed(&[0x03; 32]).public_key().to_hex();
            ("/v1/query/node", 200, format!(r#"{{"public_key":"{node}"}}"#))
        }

        fn http_relayer(
            config: RelayConfig,
            height: i64,
        ) -> Relayer<Keypair, Arc<HttpTransport>, Arc<HttpTransport>> {
            let transport = Arc::new(HttpTransport::new(&config).unwrap());
            let keys = KeyRing::new(vec![Keypair::from_seed(&[0x01; 32])], servicer()).unwrap();
            Relayer::new(
                keys,
                Arc::new(SessionState::with_height(height)),
                Arc::clone(&transport),
                transport,
                config,
            )
        }

        #[tokio::test]
        async fn test_accepted_relay_body_is_signed_relay() {
            let (addr, seen) = serve(vec![
                node_route(),
                ("/v1/client/relay", 200, r#"{"result":"0x10"}"#.into()),
            ]);
            let relayer = http_relayer(config_for(addr), 5);

            assert_eq!(relayer.relay_eth().await.unwrap(), r#"{"result":"0x10"}"#);

            let seen = seen.lock().clone();
            assert_eq!(seen[0].0, "/v1/query/node");
            assert_eq!(
                seen[0].1,
                format!(r#"{{"address":"{}"}}"#, servicer().address().to_hex())
            );
            assert_eq!(seen[1].0, "/v1/client/relay");
            let relay: Relay = serde_json::from_str(&seen[1].1).unwrap();
            relay.proof.verify().unwrap();
            assert_eq!(relay.meta.block_height, 5);
        }

        #[tokio::test]
        async fn test_dispatch_height_becomes_correction() {
            let rejection = r#"{"error":{"message":"the block height passed is invalid for the session"},"dispatch":{"session":{"header":{"session_height":9}}}}"#;
            let (addr, _) = serve(vec![
                node_route(),
                ("/v1/client/relay", 400, rejection.into()),
            ]);
            let relayer = http_relayer(config_for(addr), 5);

            let err = relayer.relay_eth().await.unwrap_err();
            assert!(matches!(
                err,
                RelayError::RejectedWithCorrection { new_height: 9, .. }
            ));
            assert_eq!(relayer.session().current(), 9);
        }

        #[tokio::test]
        async fn test_rejection_without_height_is_rejected_other() {
            let rejection = r#"{"error":{"message":"invalid signature"}}"#;
            let (addr, _) = serve(vec![
                node_route(),
                ("/v1/client/relay", 400, rejection.into()),
            ]);
            let relayer = http_relayer(config_for(addr), 5);

            let err = relayer.relay_eth().await.unwrap_err();
            assert!(matches!(
                &err,
                RelayError::RejectedOther { message } if message == "invalid signature"
            ));
            assert_eq!(relayer.session().current(), 5);
        }

        #[tokio::test]
        async fn test_non_json_rejection_is_transport_failure() {
            let (addr, _) = serve(vec![
                node_route(),
                ("/v1/client/relay", 400, "<html>bad request</html>".into()),
            ]);
            let relayer = http_relayer(config_for(addr), 5);

            let err = relayer.relay_eth().await.unwrap_err();
            assert!(matches!(err, RelayError::Transport(_)));
            assert_eq!(relayer.session().current(), 5);
        }

        #[tokio::test]
        async fn test_server_error_is_unexpected_response() {
            let (addr, _) = serve(vec![
                node_route(),
                ("/v1/client/relay", 502, "bad gateway".into()),
            ]);
            let relayer = http_relayer(config_for(addr), 5);

            let err = relayer.relay_eth().await.unwrap_err();
            match err {
                RelayError::UnexpectedResponse { status, body } => {
                    assert_eq!(status, 502);
                    assert_eq!(body, "bad gateway");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_connection_refused_is_transport_failure() {
            let addr = {
                let listener = TcpListener::bind("127.0.0.1:0").unwrap();
                listener.local_addr().unwrap()
            };
            let relayer = http_relayer(config_for(addr), 5);

            let err = relayer.relay_eth().await.unwrap_err();
            assert!(matches!(err, RelayError::Transport(_)));
            assert!(err.is_retryable());
        }

        #[tokio::test]
        async fn test_node_lookup_found_and_missing() {
            let (addr, _) = serve(vec![node_route()]);
            let transport = HttpTransport::new(&config_for(addr)).unwrap();
            let node = transport
                .lookup_service_node(&servicer().address())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(node.public_key, Keypair::from_seed(&[0x03; 32]).public_key().to_hex());

            let (addr, seen) = serve(Vec::new());
            let relayer = http_relayer(config_for(addr), 5);
            let err = relayer.relay_eth().await.unwrap_err();
            assert!(matches!(
                err,
                RelayError::NodeNotFound { address } if address == servicer().address()
            ));
            assert_eq!(seen.lock().len(), 1);
        }

        #[tokio::test]
        async fn test_unparseable_node_is_transport_failure() {
            let (addr, seen) = serve(vec![(
                "/v1/query/node",
                200,
                "<html>proxy error</html>".into(),
            )]);
            let relayer = http_relayer(config_for(addr), 5);

            let err = relayer.relay_eth().await.unwrap_err();
            assert!(matches!(err, RelayError::Transport(_)));
            assert_eq!(seen.lock().len(), 1);
        }

        #[tokio::test]
        async fn test_query_height() {
            let (addr, _) = serve(vec![("/v1/query/height", 200, r#"{"height":120}"#.into())]);
            let relayer = http_relayer(config_for(addr), 5);
            assert_eq!(relayer.query_height().await.unwrap(), 120);
            assert_eq!(relayer.session().current(), 5);

            let (addr, _) = serve(Vec::new());
            let relayer = http_relayer(config_for(addr), 5);
            assert!(matches!(
                relayer.query_height().await,
                Err(RelayError::Transport(_))
            ));
        }
    }
}
