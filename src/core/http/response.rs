//=========================================================================
// Response
//=========================================================================
//
// Terminal result of one request node.
//
// Classification is strictly ordered: a transport error makes the
// response a network error regardless of status; otherwise 2xx is a
// success and anything else an application-level failure.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

//=== Response ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
    headers: BTreeMap<String, String>,
    error: Option<String>,
}

impl Response {
    //--- Construction -----------------------------------------------------

    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Transport-level failure (unresolved host, timeout, refused).
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    //--- Classification ---------------------------------------------------

    pub fn is_network_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_success(&self) -> bool {
        !self.is_network_error() && (200..300).contains(&self.status)
    }

    /// Well-formed response with an error status (4xx/5xx).
    pub fn is_http_error(&self) -> bool {
        !self.is_network_error() && self.status >= 400
    }

    //--- Accessors --------------------------------------------------------

    /// Status code, 0 for network errors.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Transport error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn classification_is_exclusive() {
        let ok = Response::new(204);
        let missing = Response::new(404);
        let redirect = Response::new(302);
        let offline = Response::network_error("host not found");

        assert!(ok.is_success() && !ok.is_http_error() && !ok.is_network_error());
        assert!(!missing.is_success() && missing.is_http_error());
        assert!(!redirect.is_success() && !redirect.is_http_error());
        assert!(offline.is_network_error() && !offline.is_success() && !offline.is_http_error());
        assert_eq!(offline.status(), 0);
        assert_eq!(offline.error(), Some("host not found"));
    }

    #[test]
    fn json_body_decodes() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Token {
            token: String,
        }

        let response = Response::new(200).with_body(r#"{"token":"abc"}"#);

        assert_eq!(response.json::<Token>().unwrap(), Token { token: "abc".into() });
        assert_eq!(response.text(), r#"{"token":"abc"}"#);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response::new(200).with_header("X-Session", "42");

        assert_eq!(response.header("x-session"), Some("42"));
        assert!(response.header("missing").is_none());
    }
}
