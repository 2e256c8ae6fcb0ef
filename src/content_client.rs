use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::content::{ContentPayload, ContentRequest, ContentSource, parse_content_json};

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// Content backend reached over JSON: `POST {base}/broadcast/{endpoint}`.
pub struct HttpContentSource {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpContentSource {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            timeout,
        }
    }

    pub fn url_for(&self, request: &ContentRequest) -> String {
        format!("{}/broadcast/{}", self.base_url, request.kind.endpoint())
    }
}

impl ContentSource for HttpContentSource {
    fn generate(&self, request: &ContentRequest) -> Result<ContentPayload> {
        let client = http_client(self.timeout)?;
        let url = self.url_for(request);

        let mut req = client
            .post(&url)
            .header(USER_AGENT, concat!("booth_terminal/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .json(request);
        if let Some(token) = self.token.as_ref() {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = req.send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, truncate(&body, 200)));
        }
        parse_content_json(request.kind, &body)
    }
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(max).collect();
    out.push('…');
    out
}
