//! Transport-neutral request model
//!
//! Handlers receive a `PageRequest` instead of a hyper request so the body has
//! already been collected and size-checked by the time a handler runs.

use hyper::body::Bytes;
use hyper::Method;
use percent_encoding::percent_decode;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Request data a page handler can see
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: Method,
    /// Raw query string (without leading ?)
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl PageRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: None,
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// First value of a form field, as the decoded raw bytes
    ///
    /// Urlencoded body fields take precedence over query parameters. Values
    /// are not required to be UTF-8.
    pub fn form_value(&self, key: &str) -> Option<Vec<u8>> {
        if self.has_form_body() {
            if let Some(value) = first_value(&self.body, key) {
                return Some(value);
            }
        }
        let query = self.query.as_deref()?;
        first_value(query.as_bytes(), key)
    }

    fn has_form_body(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_URLENCODED))
        })
    }
}

#[cfg(test)]
impl PageRequest {
    /// Request carrying a urlencoded form body
    pub fn form(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some(FORM_URLENCODED.to_string()),
            body: body.into(),
            ..Self::new(method)
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }
}

/// Find `key` in `application/x-www-form-urlencoded` data and decode its value
fn first_value(raw: &[u8], key: &str) -> Option<Vec<u8>> {
    raw.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (name, value) = match pair.iter().position(|&b| b == b'=') {
                Some(i) => (&pair[..i], &pair[i + 1..]),
                None => (pair, &[][..]),
            };
            (form_decode(name) == key.as_bytes()).then(|| form_decode(value))
        })
}

/// Percent-decode a form component, with `+` standing for a space
fn form_decode(component: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = component
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_value_decodes_body() {
        let req = PageRequest::form(Method::POST, "body=Hello+World%21&other=1");
        assert_eq!(req.form_value("body").as_deref(), Some(&b"Hello World!"[..]));
        assert_eq!(req.form_value("other").as_deref(), Some(&b"1"[..]));
        assert_eq!(req.form_value("missing"), None);
    }

    #[test]
    fn test_form_value_keeps_non_utf8_bytes() {
        let req = PageRequest::form(Method::POST, "body=%FF%FEok");
        assert_eq!(req.form_value("body"), Some(vec![0xff, 0xfe, b'o', b'k']));
    }

    #[test]
    fn test_form_value_edge_shapes() {
        let req = PageRequest::form(Method::POST, "&flag&body=a%3Db%26c&b%6Fdy=later");
        assert_eq!(req.form_value("flag"), Some(Vec::new()));
        assert_eq!(req.form_value("body").as_deref(), Some(&b"a=b&c"[..]));
    }

    #[test]
    fn test_form_value_first_wins() {
        let req = PageRequest::form(Method::POST, "body=first&body=second");
        assert_eq!(req.form_value("body").as_deref(), Some(&b"first"[..]));
    }

    #[test]
    fn test_body_ignored_without_form_content_type() {
        let mut req = PageRequest::new(Method::POST);
        req.body = Bytes::from("body=raw");
        assert_eq!(req.form_value("body"), None);

        req.content_type = Some("application/x-www-form-urlencoded; charset=UTF-8".into());
        assert_eq!(req.form_value("body").as_deref(), Some(&b"raw"[..]));
    }

    #[test]
    fn test_body_field_beats_query() {
        let req = PageRequest::form(Method::POST, "body=from-form").with_query("body=from-query");
        assert_eq!(req.form_value("body").as_deref(), Some(&b"from-form"[..]));

        let req = PageRequest::form(Method::POST, "x=1").with_query("body=from-query");
        assert_eq!(req.form_value("body").as_deref(), Some(&b"from-query"[..]));
    }

    #[test]
    fn test_is_head() {
        assert!(PageRequest::new(Method::HEAD).is_head());
        assert!(!PageRequest::new(Method::GET).is_head());
    }
}
