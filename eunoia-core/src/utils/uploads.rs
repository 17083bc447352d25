// src/utils/uploads.rs
//
// Media URLs arrive in three historical forms: bare `/uploads/...` paths,
// absolute URLs pointing at a local development host, and already-canonical
// `/api/uploads/...` paths. Everything is normalized to the canonical form;
// anything else passes through untouched.

use serde_json::Value;
use url::Url;

const UPLOAD_PREFIX: &str = "/uploads/";
const API_UPLOAD_PREFIX: &str = "/api/uploads/";

fn is_likely_local_host(hostname: &str) -> bool {
    let lower = hostname.to_lowercase();
    matches!(lower.as_str(), "localhost" | "127.0.0.1" | "::1" | "[::1]")
        || lower.starts_with("127.")
}

fn ensure_api_uploads_path(pathname: &str) -> Option<String> {
    if pathname.is_empty() {
        return None;
    }
    if pathname.starts_with(API_UPLOAD_PREFIX) {
        return Some(pathname.to_string());
    }
    pathname
        .strip_prefix(UPLOAD_PREFIX)
        .map(|rest| format!("{}{}", API_UPLOAD_PREFIX, rest))
}

/// Pure and total: never fails, never touches I/O, idempotent.
pub fn normalize_upload_url(input: &str) -> String {
    let value = input.trim();
    if value.is_empty() {
        return value.to_string();
    }
    if value.starts_with(API_UPLOAD_PREFIX) {
        return value.to_string();
    }
    if let Some(rest) = value.strip_prefix(UPLOAD_PREFIX) {
        return format!("{}{}", API_UPLOAD_PREFIX, rest);
    }
    if let Ok(url) = Url::parse(value) {
        if let Some(host) = url.host_str() {
            if is_likely_local_host(host) {
                if let Some(normalized) = ensure_api_uploads_path(url.path()) {
                    return normalized;
                }
            }
        }
    }
    value.to_string()
}

/// Normalize the avatar inside a shared-persona snapshot, leaving every
/// other value (including non-object snapshots) untouched.
pub fn normalize_shared_style_avatar(data: &mut Value) {
    let Value::Object(map) = data else {
        return;
    };
    let Some(Value::String(avatar)) = map.get("avatar") else {
        return;
    };
    let normalized = normalize_upload_url(avatar);
    if normalized != *avatar {
        map.insert("avatar".to_string(), Value::String(normalized));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_paths_are_unchanged() {
        assert_eq!(normalize_upload_url("/api/uploads/x.png"), "/api/uploads/x.png");
    }

    #[test]
    fn legacy_paths_get_the_api_prefix() {
        assert_eq!(normalize_upload_url("/uploads/x.png"), "/api/uploads/x.png");
    }

    #[test]
    fn loopback_urls_are_reduced_to_their_path() {
        assert_eq!(
            normalize_upload_url("http://localhost:3001/uploads/x.png"),
            "/api/uploads/x.png"
        );
        assert_eq!(
            normalize_upload_url("http://127.0.0.1:3001/uploads/a/b.gif"),
            "/api/uploads/a/b.gif"
        );
        assert_eq!(
            normalize_upload_url("http://127.1.2.3/uploads/c.webp"),
            "/api/uploads/c.webp"
        );
        assert_eq!(
            normalize_upload_url("http://[::1]:3001/uploads/d.jpg"),
            "/api/uploads/d.jpg"
        );
    }

    #[test]
    fn remote_urls_pass_through() {
        assert_eq!(
            normalize_upload_url("https://cdn.example.com/x.png"),
            "https://cdn.example.com/x.png"
        );
    }

    #[test]
    fn loopback_urls_outside_uploads_pass_through() {
        assert_eq!(
            normalize_upload_url("http://localhost:3001/other/x.png"),
            "http://localhost:3001/other/x.png"
        );
    }

    #[test]
    fn unparseable_input_passes_through() {
        assert_eq!(normalize_upload_url("not a url"), "not a url");
        assert_eq!(normalize_upload_url(""), "");
        assert_eq!(normalize_upload_url("   "), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in [
            "/uploads/x.png",
            "/api/uploads/x.png",
            "http://localhost:3001/uploads/x.png",
            "https://cdn.example.com/x.png",
            "🤗",
        ] {
            let once = normalize_upload_url(input);
            assert_eq!(normalize_upload_url(&once), once);
        }
    }

    #[test]
    fn shared_style_avatar_is_normalized_in_place() {
        let mut data = json!({"name": "暖心陪伴", "avatar": "/uploads/a.png"});
        normalize_shared_style_avatar(&mut data);
        assert_eq!(data["avatar"], "/api/uploads/a.png");

        // Emoji avatars and non-object snapshots are left alone.
        let mut emoji = json!({"avatar": "🤗"});
        normalize_shared_style_avatar(&mut emoji);
        assert_eq!(emoji["avatar"], "🤗");

        let mut scalar = json!("nope");
        normalize_shared_style_avatar(&mut scalar);
        assert_eq!(scalar, json!("nope"));
    }
}
