//=========================================================================
// Request Spec
//=========================================================================
//
// Transport-neutral description of one HTTP call: method, URL, headers,
// body and the response shape the caller wants back.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

use serde::Serialize;

//=== Content Types =======================================================

pub mod content_type {
    pub const JSON: &str = "application/json";
    pub const PLAIN_TEXT: &str = "text/plain";
    pub const HTML: &str = "text/html";
    pub const X_WWW_FORM: &str = "application/x-www-form-urlencoded";
    pub const MULTI_PART: &str = "multipart/form-data";
}

pub mod mime_type {
    pub const IMAGE_PNG: &str = "image/png";
    pub const IMAGE_JPG: &str = "image/jpg";
    pub const IMAGE_GIF: &str = "image/gif";
}

pub const CONTENT_TYPE: &str = "Content-Type";

//=== Method ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

//=== ResponseType ========================================================

/// What the caller intends to read from the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseType {
    None,
    #[default]
    Text,
    Texture,
    ReadableTexture,
}

//=== RequestSpec =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestSpec {
    method: Method,
    url: String,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    response_type: ResponseType,
}

impl RequestSpec {
    //--- Construction -----------------------------------------------------

    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::Head, url)
    }

    /// Request with a JSON body serialized from `value`.
    pub fn json<T: Serialize + ?Sized>(
        method: Method,
        url: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(method, url)
            .with_header(CONTENT_TYPE, content_type::JSON)
            .with_body(body))
    }

    /// Request with an `application/x-www-form-urlencoded` body.
    pub fn form<K, V>(method: Method, url: impl Into<String>, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::new(method, url)
            .with_header(CONTENT_TYPE, content_type::X_WWW_FORM)
            .with_body(encode_form(fields).into_bytes())
    }

    //--- Builders ---------------------------------------------------------

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Appends url-encoded `fields` to the query string.
    pub fn with_query<K, V>(mut self, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if fields.is_empty() {
            return self;
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        self.url.push(separator);
        self.url.push_str(&encode_form(fields));
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
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

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }
}

fn encode_form<K, V>(fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Login<'a> {
        user: &'a str,
        level: u32,
    }

    #[test]
    fn json_body_sets_content_type() {
        let spec = RequestSpec::json(Method::Post, "https://api.test/login", &Login { user: "ana", level: 3 })
            .unwrap();

        assert_eq!(spec.method(), Method::Post);
        assert_eq!(spec.header("content-type"), Some(content_type::JSON));
        assert_eq!(spec.body(), Some(br#"{"user":"ana","level":3}"#.as_slice()));
    }

    #[test]
    fn form_body_is_url_encoded() {
        let spec = RequestSpec::form(Method::Post, "https://api.test/form", &[("name", "Ana Lee"), ("q", "a&b")]);

        assert_eq!(spec.header(CONTENT_TYPE), Some(content_type::X_WWW_FORM));
        assert_eq!(spec.body(), Some(b"name=Ana%20Lee&q=a%26b".as_slice()));
    }

    #[test]
    fn query_appends_with_correct_separator() {
        let plain = RequestSpec::get("https://api.test/items").with_query(&[("page", "2")]);
        let existing = RequestSpec::get("https://api.test/items?sort=asc").with_query(&[("page", "2")]);
        let empty: &[(&str, &str)] = &[];
        let untouched = RequestSpec::get("https://api.test/items").with_query(empty);

        assert_eq!(plain.url(), "https://api.test/items?page=2");
        assert_eq!(existing.url(), "https://api.test/items?sort=asc&page=2");
        assert_eq!(untouched.url(), "https://api.test/items");
    }

    #[test]
    fn defaults_to_get_with_text_response() {
        let spec = RequestSpec::get("https://api.test");

        assert_eq!(spec.method().as_str(), "GET");
        assert_eq!(spec.response_type(), ResponseType::Text);
        assert!(spec.body().is_none());
    }
}
