//! Single-attempt upload of a validated SARIF report.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::sarif::{DualValidator, EnhancedValidationResult};

pub const DEFAULT_BASE_URL: &str = "https://api.vulnetix.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const UPLOAD_PATH: &str = "/api/sarif/upload";

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub base_url: String,
    pub org_id: Uuid,
    pub timeout: Duration,
    pub content_type: String,
    pub user_agent: String,
}

impl UploadConfig {
    pub fn new(base_url: impl Into<String>, org_id: Uuid) -> Self {
        Self {
            base_url: base_url.into(),
            org_id,
            timeout: DEFAULT_TIMEOUT,
            content_type: "application/json".to_string(),
            user_agent: format!("vulnetix-cli/{}", crate::VERSION),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{UPLOAD_PATH}", self.base_url.trim_end_matches('/'))
    }
}

/// Server acknowledgement of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub artifact_id: String,
    pub status: u16,
}

#[derive(Error, Debug)]
pub enum UploadError {
    /// Local validation failed; nothing was sent.
    #[error("SARIF validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("upload request failed: {0}")]
    Transport(String),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Transport(err.to_string())
    }
}

pub struct Uploader {
    config: UploadConfig,
    client: Client,
    validator: DualValidator,
}

impl Uploader {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UploadError::Client(e.to_string()))?;

        Ok(Self {
            config,
            client,
            validator: DualValidator::new(),
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Validate `sarif` locally, then POST it once.
    pub fn upload(&self, sarif: &[u8]) -> Result<UploadReceipt, UploadError> {
        let validation = self.validator.validate(sarif);
        self.upload_validated(sarif, &validation)
    }

    /// POST `sarif` once, using a validation result the caller already holds
    /// for the same bytes.
    pub fn upload_validated(
        &self,
        sarif: &[u8],
        validation: &EnhancedValidationResult,
    ) -> Result<UploadReceipt, UploadError> {
        if !validation.valid {
            return Err(UploadError::Validation(validation.all_errors()));
        }

        let url = self.config.endpoint();
        debug!(%url, bytes = sarif.len(), "uploading SARIF report");

        let response = self
            .client
            .post(&url)
            .header("X-Org-ID", self.config.org_id.to_string())
            .header(CONTENT_TYPE, &self.config.content_type)
            .header(USER_AGENT, &self.config.user_agent)
            .body(sarif.to_vec())
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;

        match interpret_response(status, &body) {
            Ok(receipt) => {
                info!(status, artifact_id = %receipt.artifact_id, "SARIF report uploaded");
                Ok(receipt)
            }
            Err(e) => {
                warn!(status, "SARIF upload rejected");
                Err(e)
            }
        }
    }
}

/// Map an HTTP status and body to the upload outcome.
pub fn interpret_response(status: u16, body: &str) -> Result<UploadReceipt, UploadError> {
    if (200..300).contains(&status) {
        return Ok(UploadReceipt {
            artifact_id: body.trim().to_string(),
            status,
        });
    }

    let message = match status {
        400 => format!("Bad request: {body}"),
        401 => "Invalid or missing organization ID".to_string(),
        403 => "Organization access forbidden".to_string(),
        404 => "Organization not found".to_string(),
        413 => "SARIF file too large".to_string(),
        500 => "Server error during upload".to_string(),
        other => format!("Unexpected status code {other}: {body}"),
    };
    Err(UploadError::Rejected { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const VALID_SARIF: &[u8] = br#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"T"}},"results":[]}]}"#;

    fn org() -> Uuid {
        Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap()
    }

    struct Captured {
        request_line: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Accept one connection, capture the request, answer with `status` and `body`.
    fn one_shot_server(status: u16, body: &'static str) -> (String, thread::JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((k, v)) = line.split_once(':') {
                    headers.push((k.trim().to_string(), v.trim().to_string()));
                }
            }

            let len = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body_buf = vec![0; len];
            reader.read_exact(&mut body_buf).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();

            Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: body_buf,
            }
        });

        (base, handle)
    }

    #[test]
    fn status_mapping() {
        let msg = |status, body| match interpret_response(status, body) {
            Err(UploadError::Rejected { message, .. }) => message,
            other => panic!("expected rejection, got {other:?}"),
        };

        assert_eq!(msg(400, "missing runs"), "Bad request: missing runs");
        assert_eq!(msg(401, ""), "Invalid or missing organization ID");
        assert_eq!(msg(403, ""), "Organization access forbidden");
        assert_eq!(msg(404, ""), "Organization not found");
        assert_eq!(msg(413, ""), "SARIF file too large");
        assert_eq!(msg(500, ""), "Server error during upload");
        assert_eq!(msg(418, "teapot"), "Unexpected status code 418: teapot");
    }

    #[test]
    fn any_2xx_is_success_with_trimmed_id() {
        for status in [200, 201, 202] {
            let receipt = interpret_response(status, "  abc-123\n").unwrap();
            assert_eq!(receipt.artifact_id, "abc-123");
            assert_eq!(receipt.status, status);
        }
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let cfg = UploadConfig::new("https://api.example.com/", org());
        assert_eq!(cfg.endpoint(), "https://api.example.com/api/sarif/upload");
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn posts_validated_report_with_headers() {
        let (base, server) = one_shot_server(201, "artifact-42\n");
        let uploader = Uploader::new(UploadConfig::new(base, org())).unwrap();

        let receipt = uploader.upload(VALID_SARIF).unwrap();
        let captured = server.join().unwrap();

        assert_eq!(receipt.artifact_id, "artifact-42");
        assert_eq!(receipt.status, 201);
        assert!(captured.request_line.starts_with("POST /api/sarif/upload "));
        assert_eq!(
            captured.header("x-org-id"),
            Some("123e4567-e89b-12d3-a456-426614174000")
        );
        assert_eq!(captured.header("content-type"), Some("application/json"));
        assert!(captured.header("user-agent").unwrap().starts_with("vulnetix-cli/"));
        assert_eq!(captured.body, VALID_SARIF);
    }

    #[test]
    fn server_rejection_is_reported() {
        let (base, server) = one_shot_server(401, "");
        let uploader = Uploader::new(UploadConfig::new(base, org())).unwrap();

        let err = uploader.upload(VALID_SARIF).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, UploadError::Rejected { status: 401, .. }));
        assert_eq!(
            err.to_string(),
            "upload rejected (401): Invalid or missing organization ID"
        );
    }

    #[test]
    fn invalid_report_is_never_sent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let uploader = Uploader::new(UploadConfig::new(base, org())).unwrap();

        let err = uploader.upload(br#"{"version":"2.1.0","runs":[]}"#).unwrap_err();

        assert!(matches!(err, UploadError::Validation(_)));
        listener.set_nonblocking(true).unwrap();
        let pending = listener.accept();
        assert!(
            matches!(&pending, Err(e) if e.kind() == std::io::ErrorKind::WouldBlock),
            "no connection expected"
        );
    }

    #[test]
    fn upload_validated_reuses_the_given_result() {
        let (base, server) = one_shot_server(200, "artifact-7");
        let uploader = Uploader::new(UploadConfig::new(base, org())).unwrap();
        let validation = DualValidator::new().validate(VALID_SARIF);

        let receipt = uploader.upload_validated(VALID_SARIF, &validation).unwrap();
        let captured = server.join().unwrap();

        assert_eq!(receipt.artifact_id, "artifact-7");
        assert_eq!(captured.body, VALID_SARIF);
    }

    #[test]
    fn upload_validated_refuses_a_failed_result() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let uploader = Uploader::new(UploadConfig::new(base, org())).unwrap();
        let validation = DualValidator::new().validate(b"null");

        let err = uploader.upload_validated(b"null", &validation).unwrap_err();

        assert!(matches!(err, UploadError::Validation(ref errors) if errors.len() == 3));
        listener.set_nonblocking(true).unwrap();
        assert!(listener.accept().is_err());
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let uploader = Uploader::new(
            UploadConfig::new(base, org()).with_timeout(Duration::from_secs(5)),
        )
        .unwrap();

        let err = uploader.upload(VALID_SARIF).unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }
}
