use std::path::Path;

use url::Url;

/// Result of fetching a URL or reading a local page
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub html: String,
    pub url: String,
    pub status: u16,
    pub content_type: String,
}

/// Error during fetch
#[derive(Debug)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Add a scheme to bare host names; leave anything with a scheme alone.
pub fn normalize_url(url_str: &str) -> Result<Url, FetchError> {
    let url = if url_str.contains("://") {
        url_str.to_string()
    } else {
        format!("https://{}", url_str)
    };
    Url::parse(&url).map_err(|e| FetchError {
        message: format!("Invalid URL: {}", e),
    })
}

/// Fetch a URL and return the HTML content (blocking).
pub fn fetch_url(url_str: &str) -> Result<FetchResult, FetchError> {
    let parsed = normalize_url(url_str)?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(
            "Mozilla/5.0 (compatible; ALICE-Find/",
            env!("CARGO_PKG_VERSION"),
            ")"
        ))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError {
            message: format!("Client error: {}", e),
        })?;

    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(|e| FetchError {
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let final_url = response.url().to_string();

    let html = response.text().map_err(|e| FetchError {
        message: format!("Failed to read body: {}", e),
    })?;

    log::debug!("fetched {} ({}, {} bytes)", final_url, status, html.len());

    Ok(FetchResult {
        html,
        url: final_url,
        status,
        content_type,
    })
}

/// Read `source` from disk when it names an existing file, otherwise
/// fetch it over the network.
pub fn load_source(source: &str) -> Result<FetchResult, FetchError> {
    let path = Path::new(source);
    if !path.is_file() {
        return fetch_url(source);
    }

    let html = std::fs::read_to_string(path).map_err(|e| FetchError {
        message: format!("Cannot read {}: {}", path.display(), e),
    })?;
    let url = path
        .canonicalize()
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| source.to_string());

    log::debug!("loaded {} ({} bytes)", url, html.len());

    Ok(FetchResult {
        html,
        url,
        status: 200,
        content_type: "text/html".to_string(),
    })
}
