//! reqwest-backed transport.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE};
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{ResponseContent, Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;
use crate::method::RestMethod;
use crate::value::{FileParam, ParamMap, ParamValue};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    pool_max_idle_per_host: usize,
}

impl HttpTransportBuilder {
    fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_max_idle_per_host: 10,
        }
    }

    /// Sets the request timeout.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use std::time::Duration;
    ///
    /// let transport = HttpTransport::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()?;
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of idle pooled connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Builds the [`HttpTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .build()?;
        Ok(HttpTransport { client })
    }
}

/// HTTP transport built on `reqwest`.
///
/// Encoding rules:
/// - GET and DELETE send body parameters as the query string. Arrays and
///   objects expand into bracketed keys (`tags[0]=a`, `filter[kind]=b`);
///   null values are left out.
/// - POST with more than one file sends `multipart/form-data`: file parts
///   first, then body fields as text parts.
/// - Every other POST, and all PUT and PATCH requests, send body
///   parameters as a JSON object. File parameters are not sent on this
///   path.
///
/// Responses whose `Content-Disposition` is an attachment are returned as
/// binary; `application/json` responses are parsed; everything else is
/// returned as lossy UTF-8 text. Non-2xx statuses are returned, not raised.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: &TransportRequest) -> Result<reqwest::Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookies) = &request.cookies {
            builder = builder.header(COOKIE, cookies.as_str());
        }

        builder = match request.method {
            RestMethod::Post if request.files.len() > 1 => {
                builder.multipart(multipart_form(&request.files, &request.body).await?)
            }
            method if method.has_body() => {
                if !request.files.is_empty() {
                    warn!(
                        url = %request.url,
                        files = request.files.len(),
                        "File parameters are not sent with a JSON body"
                    );
                }
                builder.json(&json_body(&request.body))
            }
            _ => builder.query(&query_pairs(&request.body)),
        };

        Ok(builder.send().await?)
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "Sending HTTP request");
        let response = self.send(request).await?;
        read_response(response).await
    }
}

fn json_body(body: &ParamMap) -> Value {
    let fields: Map<String, Value> = body
        .iter()
        .filter_map(|(name, value)| value.as_value().map(|v| (name.clone(), v.clone())))
        .collect();
    Value::Object(fields)
}

fn query_pairs(body: &ParamMap) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(body.len());
    for (name, value) in body {
        match value {
            ParamValue::Value(value) => push_query_pair(&mut pairs, name.clone(), value),
            ParamValue::File(_) => pairs.push((name.clone(), value.to_path_segment())),
        }
    }
    pairs
}

fn push_query_pair(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_query_pair(pairs, format!("{key}[{index}]"), item);
            }
        }
        Value::Object(fields) => {
            for (field, item) in fields {
                push_query_pair(pairs, format!("{key}[{field}]"), item);
            }
        }
        Value::String(text) => pairs.push((key, text.clone())),
        other => pairs.push((key, other.to_string())),
    }
}

async fn file_part(value: &ParamValue) -> Result<Part, TransportError> {
    let part = match value {
        ParamValue::File(file @ FileParam::Path(path)) => {
            let data = tokio::fs::read(path).await?;
            let part = Part::bytes(data);
            match file.filename() {
                Some(name) => part.file_name(name),
                None => part,
            }
        }
        ParamValue::File(FileParam::Bytes { filename, data }) => {
            let part = Part::bytes(data.to_vec());
            match filename {
                Some(name) => part.file_name(name.clone()),
                None => part,
            }
        }
        ParamValue::Value(_) => Part::text(value.to_path_segment()),
    };
    Ok(part)
}

async fn multipart_form(files: &ParamMap, body: &ParamMap) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in files {
        form = form.part(name.clone(), file_part(value).await?);
    }
    for (name, value) in body {
        form = form.text(name.clone(), value.to_path_segment());
    }
    Ok(form)
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn read_response(response: reqwest::Response) -> Result<TransportResponse, TransportError> {
    let status = response.status().as_u16();
    let (is_attachment, is_json) = {
        let headers = response.headers();
        let attachment = header_str(headers, CONTENT_DISPOSITION)
            .is_some_and(|v| v.starts_with("attachment"));
        let json = header_str(headers, CONTENT_TYPE).is_some_and(|v| {
            v.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        });
        (attachment, json)
    };

    let bytes = response.bytes().await?;
    if is_attachment {
        return Ok(TransportResponse::new(status, ResponseContent::Binary(bytes)));
    }

    let text = String::from_utf8_lossy(&bytes).into_owned();
    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Ok(TransportResponse::new(status, ResponseContent::Json(value)));
        }
    }
    Ok(TransportResponse::new(status, ResponseContent::Text(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(entries: &[(&str, ParamValue)]) -> ParamMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_json_body_skips_files() {
        let body = params(&[
            ("a", 1.into()),
            ("f", FileParam::bytes(&b"x"[..], None).into()),
            ("b", json!({ "c": true }).into()),
        ]);
        assert_eq!(json_body(&body), json!({ "a": 1, "b": { "c": true } }));
    }

    #[test]
    fn test_query_pairs_stringify() {
        let body = params(&[("page", 2.into()), ("q", "rust".into()), ("all", false.into())]);
        assert_eq!(
            query_pairs(&body),
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "rust".to_string()),
                ("all".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_expand_structures() {
        let body = params(&[
            ("tags", json!(["a", 2]).into()),
            ("filter", json!({ "kind": "b", "range": [1, 3] }).into()),
            ("skip", json!(null).into()),
        ]);
        assert_eq!(
            query_pairs(&body),
            vec![
                ("tags[0]".to_string(), "a".to_string()),
                ("tags[1]".to_string(), "2".to_string()),
                ("filter[kind]".to_string(), "b".to_string()),
                ("filter[range][0]".to_string(), "1".to_string()),
                ("filter[range][1]".to_string(), "3".to_string()),
            ]
        );
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_single_file_post_warns_and_sends_json() {
        use wiremock::matchers::{body_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "note": "hello" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = TransportRequest::new(format!("{}/upload", server.uri()), RestMethod::Post);
        request.body = params(&[("note", "hello".into())]);
        request.files = params(&[("only", FileParam::bytes(&b"data"[..], None).into())]);

        let response = HttpTransport::new().unwrap().execute(&request).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(logs_contain("File parameters are not sent with a JSON body"));
    }

    #[test]
    fn test_custom_timeout_builds() {
        let transport = HttpTransport::builder()
            .timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(2)
            .build();
        assert!(transport.is_ok());
    }
}
