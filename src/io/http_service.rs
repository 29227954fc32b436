use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::io::service::{ChecklistService, Envelope, PositionRow, RecordKey, ServiceError};
use crate::model::checklist::ChecklistKind;
use crate::model::options::DepartmentOption;

/// Backend that talks to the portal API over HTTP.
///
/// Endpoints (relative to `base_url`):
/// `GET checklist-templates?type=ONBOARDING`, `GET positions`,
/// `GET departments`, `POST checklist-templates?type=...`. A save of an
/// already persisted record adds `original_name` and `original_department`
/// so the server can match a renamed row.
#[derive(Debug, Clone)]
pub struct HttpService {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    client: Client,
}

impl HttpService {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ServiceError> {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(HttpService {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned + Default>(&self, path: &str) -> Result<Envelope<T>, ServiceError> {
        let url = self.url(path);
        debug!(url, "GET");
        let body = self.send(self.client.get(&url))?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send one request and return the body of a 2xx reply
    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ServiceError> {
        let mut request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.bytes().map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }
        Ok(body.to_vec())
    }

    fn transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout.as_secs())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

impl ChecklistService for HttpService {
    fn fetch_templates(
        &self,
        kind: ChecklistKind,
    ) -> Result<Envelope<Vec<serde_json::Value>>, ServiceError> {
        self.get(&format!("checklist-templates?type={}", kind.as_wire()))
    }

    fn fetch_positions(&self) -> Result<Envelope<Vec<PositionRow>>, ServiceError> {
        self.get("positions")
    }

    fn fetch_departments(&self) -> Result<Envelope<Vec<DepartmentOption>>, ServiceError> {
        self.get("departments")
    }

    fn save_record(
        &self,
        kind: ChecklistKind,
        record: &serde_json::Value,
        previous: Option<&RecordKey>,
    ) -> Result<Envelope<serde_json::Value>, ServiceError> {
        let url = self.url(&format!("checklist-templates?type={}", kind.as_wire()));
        debug!(url, "POST");
        let mut request = self.client.post(&url).json(record);
        if let Some(key) = previous {
            request = request.query(&[
                ("original_name", key.name.as_str()),
                ("original_department", key.department.as_str()),
            ]);
        }
        let reply = self.send(request)?;
        if reply.iter().all(|b| b.is_ascii_whitespace()) {
            // Some deployments answer 204 with no body
            return Ok(Envelope::ok(serde_json::Value::Null));
        }
        Ok(serde_json::from_slice(&reply)?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single HTTP response on a local port; returns the base URL
    /// and a handle yielding the raw request that was received.
    fn serve_once(status: &str, body: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let status = status.to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
            request
        });
        (format!("http://{}", addr), handle)
    }

    /// Read headers plus a `Content-Length` body so the client never sees a
    /// reset from unread input.
    fn read_request(stream: &mut impl Read) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = HttpService::new("https://portal.example/api/", None, 5).unwrap();
        assert_eq!(svc.url("positions"), "https://portal.example/api/positions");
    }

    #[test]
    fn large_response_body_is_read_in_full() {
        let long = "x".repeat(200 * 1024);
        let body = format!(r#"{{"success": true, "data": [{{"name": "{}"}}]}}"#, long);
        let (base, server) = serve_once("200 OK", body);

        let svc = HttpService::new(&base, Some("s3cret".into()), 5).unwrap();
        let rows = svc.fetch_positions().unwrap().into_result().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.len(), 200 * 1024);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /positions "));
        assert!(
            request
                .to_ascii_lowercase()
                .contains("authorization: bearer s3cret")
        );
    }

    #[test]
    fn save_sends_previous_identity() {
        let (base, server) = serve_once("200 OK", r#"{"success": true, "data": {}}"#.into());
        let svc = HttpService::new(&base, None, 5).unwrap();
        let key = RecordKey {
            name: "Desk setup".into(),
            department: "IT".into(),
        };
        svc.save_record(
            ChecklistKind::Onboarding,
            &serde_json::json!({"name": "Desk setup v2", "department": "IT"}),
            Some(&key),
        )
        .unwrap()
        .into_result()
        .unwrap();

        let request = server.join().unwrap();
        let line = request.lines().next().unwrap();
        assert!(line.starts_with(
            "POST /checklist-templates?type=ONBOARDING&original_name=Desk+setup&original_department=IT "
        ));
        assert!(request.contains(r#""name":"Desk setup v2""#));
    }

    #[test]
    fn non_success_status_carries_body() {
        let (base, server) = serve_once("503 Service Unavailable", "down for maintenance".into());
        let svc = HttpService::new(&base, None, 5).unwrap();
        let err = svc.fetch_departments().unwrap_err();
        server.join().unwrap();
        assert_eq!(err.to_string(), "server returned HTTP 503: down for maintenance");
    }
}
