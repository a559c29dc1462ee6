use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

use fieldmeta_core::CreateMetaQuery;

use crate::error::{JiraError, Result};

/// Jira Server / Data Center REST API client for issue metadata
pub struct JiraClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl JiraClient {
    /// Create a new Jira client with Basic Auth (username and password or
    /// API token)
    pub fn new(base_url: &str, user: &str, password: &str) -> Self {
        let credentials = format!("{}:{}", user, password);
        Self::with_auth_header(base_url, format!("Basic {}", base64_encode(&credentials)))
    }

    /// Create a new Jira client authenticating with a personal access token
    pub fn with_token(base_url: &str, token: &str) -> Self {
        Self::with_auth_header(base_url, format!("Bearer {}", token))
    }

    fn with_auth_header(base_url: &str, auth_header: String) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            // Don't treat HTTP errors as errors - we'll handle them ourselves
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2{}", self.base_url, path)
    }

    /// Handle transport-level errors
    fn handle_error(&self, err: ureq::Error) -> JiraError {
        match &err {
            ureq::Error::StatusCode(401) => JiraError::Unauthorized,
            ureq::Error::StatusCode(status) => JiraError::Api {
                status: *status,
                message: format!("HTTP {}", status),
            },
            _ => JiraError::Http(err),
        }
    }

    /// Check response status and return error if not successful
    fn check_response(
        &self,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            return Ok(response);
        }

        let body = response
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::new());

        if status == 401 {
            return Err(JiraError::Unauthorized);
        }
        Err(JiraError::Api {
            status,
            message: error_message(status, body),
        })
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url, "GET");
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| self.handle_error(e))?;

        let mut response = self.check_response(response)?;
        let body = response.body_mut().read_to_string()?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(value)
    }

    // ==================== Metadata Operations ====================

    /// Get create metadata for the projects and issue types selected by
    /// `query`
    pub fn get_create_meta(&self, query: &CreateMetaQuery) -> Result<Value> {
        let params: Vec<String> = query
            .to_query_pairs()
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(&value)))
            .collect();

        let mut url = self.api_url("/issue/createmeta");
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        self.get_json(&url)
    }

    /// Get edit metadata for an existing issue
    pub fn get_edit_meta(&self, issue_key: &str) -> Result<Value> {
        let url = self.api_url(&format!(
            "/issue/{}/editmeta",
            urlencoding::encode(issue_key)
        ));

        self.get_json(&url).map_err(|e| match e {
            JiraError::Api { status: 404, .. } => JiraError::IssueNotFound(issue_key.to_string()),
            other => other,
        })
    }

    /// Get the first page of issue types a project offers for creation
    pub fn get_create_meta_issue_types(&self, project_key: &str) -> Result<Value> {
        let url = self.api_url(&format!(
            "/issue/createmeta/{}/issuetypes",
            urlencoding::encode(project_key)
        ));

        self.get_json(&url)
    }

    /// Get the first page of fields for one issue type of a project
    pub fn get_create_meta_fields(&self, project_key: &str, issue_type_id: &str) -> Result<Value> {
        let url = self.api_url(&format!(
            "/issue/createmeta/{}/issuetypes/{}",
            urlencoding::encode(project_key),
            urlencoding::encode(issue_type_id)
        ));

        self.get_json(&url)
    }
}

/// Fold a Jira error body (`{"errorMessages":[...], "errors":{...}}`) into
/// one message
fn error_message(status: u16, body: String) -> String {
    let Ok(error_response) = serde_json::from_str::<Value>(&body) else {
        return if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };
    };

    let mut messages = Vec::new();

    if let Some(errors) = error_response
        .get("errorMessages")
        .and_then(|e| e.as_array())
    {
        messages.extend(errors.iter().filter_map(|e| e.as_str()).map(str::to_string));
    }

    if let Some(errors) = error_response.get("errors").and_then(|e| e.as_object()) {
        for (field, msg) in errors {
            if let Some(s) = msg.as_str() {
                messages.push(format!("{}: {}", field, s));
            }
        }
    }

    if messages.is_empty() {
        body
    } else {
        messages.join("; ")
    }
}

/// Simple base64 encoding function
fn base64_encode(input: &str) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    let bytes = input.as_bytes();
    let mut result = String::with_capacity(bytes.len().div_ceil(3) * 4);

    for chunk in bytes.chunks(3) {
        let b0 = chunk[0] as usize;
        let b1 = chunk.get(1).copied().unwrap_or(0) as usize;
        let b2 = chunk.get(2).copied().unwrap_or(0) as usize;

        result.push(ALPHABET[b0 >> 2] as char);
        result.push(ALPHABET[((b0 & 0x03) << 4) | (b1 >> 4)] as char);
        result.push(if chunk.len() > 1 {
            ALPHABET[((b1 & 0x0f) << 2) | (b2 >> 6)] as char
        } else {
            '='
        });
        result.push(if chunk.len() > 2 {
            ALPHABET[b2 & 0x3f] as char
        } else {
            '='
        });
    }

    result
}
