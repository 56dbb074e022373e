//! HTTP request building.

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Builder for HTTP requests.
///
/// The bearer token and form body are kept out of Debug output.
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) bearer_token: Option<String>,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("body", &self.body.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Request body content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// URL-encoded form fields, in insertion order.
    Form(Vec<(String, String)>),
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: None,
            bearer_token: None,
        }
    }

    /// Set the bearer token for authentication.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Add a header, replacing any earlier value with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Ask for a JSON response.
    pub fn accept_json(self) -> Self {
        self.header("Accept", "application/json")
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// Set form body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self.header("Content-Type", "application/x-www-form-urlencoded")
    }

    /// Get a header value set on this request.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = RequestBuilder::new(RequestMethod::Get, "https://example.com/api")
            .bearer_auth("token123")
            .header("X-Custom", "value")
            .query("q", "SELECT Id FROM Account");

        assert_eq!(req.method, RequestMethod::Get);
        assert_eq!(req.url, "https://example.com/api");
        assert_eq!(req.bearer_token, Some("token123".to_string()));
        assert_eq!(req.header_value("x-custom"), Some("value"));
        assert_eq!(req.query_params.len(), 1);
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let req = RequestBuilder::new(RequestMethod::Get, "https://example.com")
            .header("accept", "text/html")
            .accept_json();

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("Accept"), Some("application/json"));
    }

    #[test]
    fn test_form_body() {
        let req = RequestBuilder::new(RequestMethod::Post, "https://example.com")
            .form([("grant_type", "refresh_token"), ("client_id", "abc")]);

        assert_eq!(
            req.body,
            Some(RequestBody::Form(vec![
                ("grant_type".to_string(), "refresh_token".to_string()),
                ("client_id".to_string(), "abc".to_string()),
            ]))
        );
        assert_eq!(
            req.header_value("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_debug_redacts_token_and_body() {
        let req = RequestBuilder::new(RequestMethod::Post, "https://example.com")
            .bearer_auth("super_secret_token")
            .form([("client_secret", "super_secret_value")]);

        let debug_output = format!("{:?}", req);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
