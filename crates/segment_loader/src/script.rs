//! Script URL and tag construction.

use serde::{Deserialize, Serialize};

/// Host serving analytics.js.
pub const CDN_HOST: &str = "cdn.segment.com";

/// MIME type of the inserted script.
pub const SCRIPT_TYPE: &str = "text/javascript";

/// The scheme the host document was served over; the script is fetched over
/// the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTPS.
    #[default]
    Https,
}

impl Scheme {
    /// Map a document protocol (`"https:"`, `"http:"`, ...) to a scheme.
    /// Anything other than `https:` is fetched over plain HTTP.
    #[must_use]
    pub fn from_protocol(protocol: &str) -> Self {
        if protocol == "https:" {
            Self::Https
        } else {
            Self::Http
        }
    }

    /// The scheme name without separator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Build the analytics.js URL for a write key.
///
/// `<scheme>://cdn.segment.com/analytics.js/v1/<api_key>/analytics.min.js`
#[must_use]
pub fn script_url(api_key: &str, scheme: Scheme) -> String {
    format!(
        "{}://{CDN_HOST}/analytics.js/v1/{api_key}/analytics.min.js",
        scheme.as_str()
    )
}

/// An asynchronous script element to insert into the host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTag {
    /// Script source URL.
    pub src: String,
    /// Script MIME type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the script loads asynchronously.
    #[serde(rename = "async")]
    pub is_async: bool,
}

impl ScriptTag {
    /// An async `text/javascript` tag for `src`.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            kind: SCRIPT_TYPE.to_string(),
            is_async: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_url_https() {
        assert_eq!(
            script_url("abc", Scheme::Https),
            "https://cdn.segment.com/analytics.js/v1/abc/analytics.min.js"
        );
    }

    #[test]
    fn test_script_url_follows_document_protocol() {
        assert_eq!(Scheme::from_protocol("https:"), Scheme::Https);
        assert_eq!(Scheme::from_protocol("http:"), Scheme::Http);
        assert_eq!(Scheme::from_protocol("file:"), Scheme::Http);
        assert_eq!(
            script_url("k", Scheme::from_protocol("http:")),
            "http://cdn.segment.com/analytics.js/v1/k/analytics.min.js"
        );
    }

    #[test]
    fn test_script_tag_is_async_javascript() {
        let tag = ScriptTag::new("https://example.test/a.js");
        assert!(tag.is_async);
        assert_eq!(tag.kind, "text/javascript");
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["type"], "text/javascript");
        assert_eq!(json["async"], true);
    }
}
