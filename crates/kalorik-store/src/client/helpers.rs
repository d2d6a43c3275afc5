//! Pure helpers: path joining, URL building, error bodies (no HTTP, no status logic).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use crate::error::{StoreError, StoreResult};

/// Join a repository-relative path onto the base directory.
pub(crate) fn join_path(base: &str, rel: &str) -> String {
    let base = base.trim_matches('/');
    let rel = rel.trim_matches('/');
    match (base.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, rel),
    }
}

/// `{api}/repos/{owner}/{repo}/contents/{path}?ref={branch}` with encoded segments.
pub(crate) fn contents_url(
    api_url: &str,
    owner: &str,
    repo: &str,
    path: &str,
    branch: Option<&str>,
) -> StoreResult<Url> {
    let mut url = Url::parse(api_url).map_err(|e| StoreError::Config {
        message: format!("invalid API URL {}: {}", api_url, e),
    })?;

    {
        let mut segments = url.path_segments_mut().map_err(|_| StoreError::Config {
            message: format!("API URL cannot be a base: {}", api_url),
        })?;
        segments
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }

    if let Some(branch) = branch {
        url.query_pairs_mut().append_pair("ref", branch);
    }

    Ok(url)
}

/// Base64 content field of a PUT body.
pub(crate) fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Human-readable message from an error response body.
///
/// Prefers the JSON `message` field; falls back to the raw body, then to the
/// status reason.
pub(crate) fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        reason.unwrap_or("no message").to_string()
    } else {
        body.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("KalorikDaten", "g_a.csv"), "KalorikDaten/g_a.csv");
        assert_eq!(join_path("/KalorikDaten/", "/g_a.csv"), "KalorikDaten/g_a.csv");
        assert_eq!(join_path("", "g_a.csv"), "g_a.csv");
        assert_eq!(join_path("KalorikDaten", ""), "KalorikDaten");
    }

    #[test]
    fn test_contents_url() {
        let url = contents_url(
            "https://api.github.com",
            "schule",
            "physik",
            "KalorikDaten/Gruppe_1_A.csv",
            Some("main"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/schule/physik/contents/KalorikDaten/Gruppe_1_A.csv?ref=main"
        );
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let url = contents_url("http://127.0.0.1:8080/", "o", "r", "Daten 2025/a#b.csv", None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/repos/o/r/contents/Daten%202025/a%23b.csv"
        );
    }

    #[test]
    fn test_contents_url_invalid_base() {
        assert!(contents_url("not a url", "o", "r", "p", None).is_err());
    }

    #[test]
    fn test_encode_content() {
        assert_eq!(encode_content(b"a,b\n"), "YSxiCg==");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message":"Bad credentials","documentation_url":"x"}"#, None),
            "Bad credentials"
        );
        assert_eq!(error_message("  ", Some("Forbidden")), "Forbidden");
        assert_eq!(error_message("plain failure", None), "plain failure");
    }
}
