//! N1QL query service client over its REST interface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{Connection, Connector, Rows};
use crate::config::{ConnectionConfig, Credential};
use crate::error::{Error, Result};
use crate::window::TimeWindow;

const QUERY_PATH: &str = "/query/service";
const PING_PATH: &str = "/admin/ping";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_SUCCESS: &str = "success";

/// Opens [`N1qlConnection`]s, one HTTP client per connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct N1qlConnector;

#[async_trait]
impl Connector for N1qlConnector {
    type Conn = N1qlConnection;

    async fn connect(
        &self,
        server: &Url,
        config: &ConnectionConfig,
    ) -> Result<N1qlConnection> {
        N1qlConnection::open(server, config)
    }
}

/// One connection to the query service, with its session settings bound.
#[derive(Debug)]
pub struct N1qlConnection {
    client: Client,
    query_url: Url,
    ping_url: Url,
    timeout: String,
    credentials: Vec<Credential>,
}

impl N1qlConnection {
    pub fn open(server: &Url, config: &ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Connect(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            query_url: endpoint(server, QUERY_PATH)?,
            ping_url: endpoint(server, PING_PATH)?,
            timeout: config.timeout_param(),
            credentials: config.credentials.clone(),
        })
    }
}

fn endpoint(server: &Url, path: &str) -> Result<Url> {
    server
        .join(path)
        .map_err(|e| Error::Connect(format!("invalid server address {server}: {e}")))
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    statement: &'a str,
    args: [i64; 2],
    timeout: &'a str,
    creds: &'a [Credential],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    signature: Option<Value>,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    errors: Vec<ServiceError>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: String,
}

impl QueryResponse {
    fn columns(&self) -> Vec<String> {
        match &self.signature {
            Some(Value::Object(fields)) => fields.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return format!("status {}", self.status.as_deref().unwrap_or("missing"));
        }
        self.errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("[{code}] {}", e.msg),
                None => e.msg.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[async_trait]
impl Connection for N1qlConnection {
    async fn ping(&self) -> Result<()> {
        let liveness = |reason: String| Error::Liveness {
            endpoint: self.ping_url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(self.ping_url.clone())
            .send()
            .await
            .map_err(|e| liveness(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(liveness(format!("HTTP {}", resp.status())));
        }
        Ok(())
    }

    async fn query(&self, statement: &str, window: TimeWindow) -> Result<Rows> {
        let failed = |reason: String| Error::Query {
            statement: statement.to_owned(),
            reason,
        };

        let body = QueryRequest {
            statement,
            args: window.args(),
            timeout: &self.timeout,
            creds: &self.credentials,
        };

        let resp = self
            .client
            .post(self.query_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let http_status = resp.status();
        let text = resp.text().await.map_err(|e| failed(e.to_string()))?;

        let parsed: QueryResponse = serde_json::from_str(&text)
            .map_err(|e| failed(format!("unexpected response (HTTP {http_status}): {e}")))?;

        tracing::debug!(
            status = ?parsed.status,
            rows = parsed.results.len(),
            errors = parsed.errors.len(),
            "Received query response"
        );

        let columns = parsed.columns();
        if parsed.is_success() && parsed.errors.is_empty() {
            return Ok(Rows::new(columns, parsed.results));
        }

        let reason = parsed.error_summary();
        if !parsed.is_success() && parsed.results.is_empty() {
            return Err(failed(reason));
        }
        // A failure after rows were delivered, or errors trailing a successful
        // result, surface once iteration is done.
        Ok(Rows::new(columns, parsed.results).with_deferred_error(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> QueryResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn columns_follow_signature_order() {
        let resp = response(json!({
            "signature": {"z": "number", "a": "string", "m": "boolean"},
            "results": [],
            "status": "success"
        }));
        assert_eq!(resp.columns(), vec!["z", "a", "m"]);
    }

    #[test]
    fn non_object_signature_has_no_columns() {
        let raw = response(json!({"signature": "json", "status": "success"}));
        assert!(raw.columns().is_empty());
        assert!(response(json!({"status": "success"})).columns().is_empty());
    }

    #[test]
    fn summarizes_service_errors() {
        let resp = response(json!({
            "status": "fatal",
            "errors": [{"code": 3000, "msg": "syntax error"}, {"msg": "second"}]
        }));
        assert!(!resp.is_success());
        assert_eq!(resp.error_summary(), "[3000] syntax error; second");
        let bare = response(json!({"status": "timeout"}));
        assert_eq!(bare.error_summary(), "status timeout");
    }

    #[test]
    fn request_body_carries_window_and_session_settings() {
        let creds = vec![Credential::new("admin:Administrator", "asdasd")];
        let body = QueryRequest {
            statement: "SELECT * FROM b WHERE ts BETWEEN $1 AND $2",
            args: [100, 200],
            timeout: "1000s",
            creds: &creds,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "statement": "SELECT * FROM b WHERE ts BETWEEN $1 AND $2",
                "args": [100, 200],
                "timeout": "1000s",
                "creds": [{"user": "admin:Administrator", "pass": "asdasd"}]
            })
        );
    }

    #[test]
    fn endpoints_replace_the_server_path() {
        let server = Url::parse("http://localhost:8093").unwrap();
        let query = endpoint(&server, QUERY_PATH).unwrap();
        let ping = endpoint(&server, PING_PATH).unwrap();
        assert_eq!(query.as_str(), "http://localhost:8093/query/service");
        assert_eq!(ping.as_str(), "http://localhost:8093/admin/ping");
    }
}
