use std::time::Duration;

use async_trait::async_trait;
use portsync_core::{ForwardedPort, PortSource, ProtocolFault, SyncError, SyncResult};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::client::{CliResult, api_url, build_http_client};

const PORT_FORWARDED_PATH: &str = "v1/openvpn/portforwarded";

/// Queries the gluetun control server for the forwarded port.
#[derive(Debug, Clone)]
pub(crate) struct ControlServerSource {
    client: Client,
    endpoint: Url,
}

impl ControlServerSource {
    pub(crate) fn new(base_url: &Url, timeout: Duration) -> CliResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            client: build_http_client(timeout, headers, false)?,
            endpoint: api_url(base_url, PORT_FORWARDED_PATH)?,
        })
    }

    fn protocol_error(&self, fault: ProtocolFault) -> SyncError {
        SyncError::SourceProtocol {
            location: self.location(),
            fault,
        }
    }
}

#[async_trait]
impl PortSource for ControlServerSource {
    fn location(&self) -> String {
        self.endpoint.to_string()
    }

    async fn resolve(&self) -> SyncResult<ForwardedPort> {
        debug!(url = %self.endpoint, "querying control server");
        let unavailable = |err: reqwest::Error| SyncError::SourceUnavailable {
            location: self.location(),
            source: Box::new(err),
        };

        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(unavailable)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(self.protocol_error(ProtocolFault::UnexpectedStatus {
                status: status.as_u16(),
            }));
        }

        let body = response.bytes().await.map_err(unavailable)?;
        let payload: Value = serde_json::from_slice(&body).map_err(|err| {
            self.protocol_error(ProtocolFault::MalformedBody {
                detail: err.to_string(),
            })
        })?;
        let value = port_value(&payload).map_err(|fault| self.protocol_error(fault))?;
        ForwardedPort::new(value)
    }
}

/// Extract the `port` field, accepting JSON integers, whole-number floats,
/// and numeric strings.
fn port_value(payload: &Value) -> Result<i64, ProtocolFault> {
    let port = match payload.get("port") {
        None | Some(Value::Null) => return Err(ProtocolFault::MissingPort),
        Some(port) => port,
    };
    let parsed = match port {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(whole_number)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ProtocolFault::MalformedPort {
        value: port.to_string(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole_number(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() <= f64::from(u32::MAX)).then(|| value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use portsync_core::ExitCode;
    use serde_json::json;

    fn source_for(server: &MockServer) -> ControlServerSource {
        let base = server.base_url().parse::<Url>().expect("mock server URL");
        ControlServerSource::new(&base, Duration::from_secs(5)).expect("control server source")
    }

    #[test]
    fn port_value_accepts_integers_and_numeric_strings() {
        assert_eq!(port_value(&json!({ "port": 51413 })), Ok(51413));
        assert_eq!(port_value(&json!({ "port": " 40000 " })), Ok(40000));
        assert_eq!(port_value(&json!({ "port": 51413.0 })), Ok(51413));
    }

    #[test]
    fn port_value_flags_missing_and_malformed_ports() {
        assert_eq!(port_value(&json!({})), Err(ProtocolFault::MissingPort));
        assert_eq!(
            port_value(&json!({ "port": null })),
            Err(ProtocolFault::MissingPort)
        );
        assert!(matches!(
            port_value(&json!({ "port": "abc" })),
            Err(ProtocolFault::MalformedPort { .. })
        ));
        assert!(matches!(
            port_value(&json!({ "port": 514.5 })),
            Err(ProtocolFault::MalformedPort { .. })
        ));
        assert!(matches!(
            port_value(&json!([51413])),
            Err(ProtocolFault::MissingPort)
        ));
    }

    #[tokio::test]
    async fn resolves_forwarded_port() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/openvpn/portforwarded")
                .header("content-type", "application/json");
            then.status(200).json_body(json!({ "port": 51413 }));
        });

        let port = source_for(&server).resolve().await.expect("port resolved");
        mock.assert();
        assert_eq!(port.get(), 51413);
    }

    #[tokio::test]
    async fn whole_float_port_is_accepted() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/openvpn/portforwarded");
            then.status(200).body(r#"{"port": 51413.0}"#);
        });

        let port = source_for(&server).resolve().await.expect("port resolved");
        assert_eq!(port.get(), 51413);
    }

    #[tokio::test]
    async fn non_ok_status_is_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/openvpn/portforwarded");
            then.status(500).body("boom");
        });

        let err = source_for(&server).resolve().await.expect_err("500");
        assert!(matches!(
            err,
            SyncError::SourceProtocol {
                fault: ProtocolFault::UnexpectedStatus { status: 500 },
                ..
            }
        ));
        assert_eq!(err.exit_code(), ExitCode::HttpError);
    }

    #[tokio::test]
    async fn zero_port_is_out_of_range() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/openvpn/portforwarded");
            then.status(200).json_body(json!({ "port": 0 }));
        });

        let err = source_for(&server).resolve().await.expect_err("port 0");
        assert!(matches!(err, SyncError::PortOutOfRange { value: 0 }));
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_port() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/openvpn/portforwarded");
            then.status(200).body("<html>gateway</html>");
        });

        let err = source_for(&server).resolve().await.expect_err("html");
        assert!(matches!(
            err,
            SyncError::SourceProtocol {
                fault: ProtocolFault::MalformedBody { .. },
                ..
            }
        ));
        assert_eq!(err.exit_code(), ExitCode::InvalidPort);
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let base = "http://127.0.0.1:9".parse::<Url>().expect("URL");
        let source =
            ControlServerSource::new(&base, Duration::from_secs(2)).expect("control server source");
        let err = source.resolve().await.expect_err("connection refused");
        assert!(matches!(err, SyncError::SourceUnavailable { .. }));
    }
}
