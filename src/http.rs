use crate::client::{BoxError, BulkFailure, BulkResponse, IndexClient};
use crate::record::LogRecord;
use async_trait::async_trait;
use reqwest::Client;

/// Configuration for [`HttpBulkClient`].
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Base URL of the cluster, e.g. "http://localhost:9200".
    pub url: String,
    /// Target index name.
    pub index: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Index client that writes records through an HTTP `_bulk` endpoint
/// using NDJSON action/document pairs.
#[derive(Clone)]
pub struct HttpBulkClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpBulkClient {
    pub fn new(config: HttpClientConfig) -> Self {
        HttpBulkClient {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/_bulk", self.config.url.trim_end_matches('/'))
    }

    fn render_bulk(&self, records: &[LogRecord]) -> Result<String, BoxError> {
        let mut body = String::new();
        for record in records {
            body.push_str(&format!(
                "{{\"index\":{{\"_index\":\"{}\"}}}}\n",
                self.config.index
            ));
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }
        Ok(body)
    }

    async fn post_bulk(&self, body: String) -> Result<BulkResponse, BoxError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/x-ndjson")
            .body(body);
        if let Some(user) = &self.config.user {
            request = request.basic_auth(user, self.config.password.as_deref());
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(format!("bulk insert failed with status {}: {}", status, text).into());
        }

        let value: serde_json::Value = resp.json().await?;
        Ok(parse_bulk_response(&value))
    }
}

/// Map the backend's bulk response body onto per-record failures. The
/// response carries one entry per submitted action, in request order.
fn parse_bulk_response(value: &serde_json::Value) -> BulkResponse {
    let mut failures = Vec::new();

    let had_errors = value
        .get("errors")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if had_errors {
        if let Some(items) = value.get("items").and_then(|v| v.as_array()) {
            for (index, item) in items.iter().enumerate() {
                if let Some(error) = item.get("index").and_then(|op| op.get("error")) {
                    let reason = error
                        .get("reason")
                        .and_then(|r| r.as_str())
                        .unwrap_or("unknown error")
                        .to_string();
                    failures.push(BulkFailure { index, reason });
                }
            }
        }
    }

    BulkResponse { failures }
}

#[async_trait]
impl IndexClient for HttpBulkClient {
    async fn submit(&self, record: &LogRecord) -> Result<(), BoxError> {
        let response = self.submit_bulk(std::slice::from_ref(record)).await?;
        if let Some(failure) = response.failures.first() {
            return Err(format!("backend rejected record: {}", failure.reason).into());
        }
        Ok(())
    }

    async fn submit_bulk(&self, records: &[LogRecord]) -> Result<BulkResponse, BoxError> {
        if records.is_empty() {
            return Ok(BulkResponse::ok());
        }
        let body = self.render_bulk(records)?;
        self.post_bulk(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_response_has_no_failures() {
        let value = json!({
            "took": 3,
            "errors": false,
            "items": [{"index": {"_index": "logs", "status": 201}}]
        });
        assert!(parse_bulk_response(&value).failures.is_empty());
    }

    #[test]
    fn rejected_items_are_reported_with_position_and_reason() {
        let value = json!({
            "took": 5,
            "errors": true,
            "items": [
                {"index": {"_index": "logs", "status": 201}},
                {"index": {"_index": "logs", "status": 400,
                           "error": {"type": "mapper_parsing_exception",
                                     "reason": "failed to parse field"}}}
            ]
        });

        let response = parse_bulk_response(&value);
        assert_eq!(response.failures.len(), 1);
        assert_eq!(response.failures[0].index, 1);
        assert_eq!(response.failures[0].reason, "failed to parse field");
    }

    #[test]
    fn bulk_body_is_one_action_and_one_document_per_record() {
        let client = HttpBulkClient::new(HttpClientConfig {
            url: "http://localhost:9200".into(),
            index: "logs".into(),
            user: None,
            password: None,
        });

        let records = vec![
            LogRecord::new("ERROR", "a"),
            LogRecord::new("WARN", "b"),
        ];
        let body = client.render_bulk(&records).unwrap();

        assert_eq!(body.lines().count(), 4);
        assert!(body.starts_with("{\"index\":{\"_index\":\"logs\"}}\n"));
        assert!(body.ends_with('\n'));
    }
}
