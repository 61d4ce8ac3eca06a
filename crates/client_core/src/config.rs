use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use shared::{protocol::Method, SyncError};
use state_store::{MergeStrategy, OrderingPolicy, ReducerConfig};
use url::Url;

pub const APPLICATION_JSON: &str = "application/json";

/// Validates a header before it can reach a request.
pub fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), SyncError> {
    let invalid = |reason: String| SyncError::InvalidHeader {
        name: name.to_string(),
        reason,
    };
    let header_name =
        HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value.trim()).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

/// Per-call overrides. Never stored; merged over the client's base headers
/// for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub content_type: Option<HeaderValue>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(mut self, content_type: &str) -> Result<Self, SyncError> {
        let (_, value) = header_pair(CONTENT_TYPE.as_str(), content_type)?;
        self.content_type = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, SyncError> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// Settings fixed for the lifetime of a `ResourceClient`.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub base_url: Option<Url>,
    pub headers: HeaderMap,
    pub reducer: ReducerConfig,
    pub ordering: OrderingPolicy,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative targets are joined onto `base_url`, which is treated as a
    /// directory even without a trailing slash.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, SyncError> {
        let mut url = Url::parse(base_url).map_err(|e| SyncError::InvalidTarget {
            target: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn with_header(self, name: &str, value: &str) -> Result<Self, SyncError> {
        let (name, value) = header_pair(name, value)?;
        Ok(self.with_header_value(name, value))
    }

    pub fn with_header_value(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.reducer.identifier_field = field.into();
        self
    }

    pub fn with_merge_strategy(mut self, merge: MergeStrategy) -> Self {
        self.reducer.merge = merge;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn resolve(&self, target: &str) -> Result<Url, SyncError> {
        let invalid = |reason: String| SyncError::InvalidTarget {
            target: target.to_string(),
            reason,
        };
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .base_url
                    .as_ref()
                    .ok_or_else(|| invalid("relative target without a base url".into()))?;
                base.join(target).map_err(|e| invalid(e.to_string()))
            }
            Err(e) => Err(invalid(e.to_string())),
        }
    }

    /// Base headers, then the method's default content type, then the
    /// call's content type, then the call's own headers.
    pub fn request_headers(&self, method: Method, options: &RequestOptions) -> HeaderMap {
        let mut headers = self.headers.clone();
        if matches!(method, Method::Get | Method::Delete) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        if let Some(content_type) = &options.content_type {
            headers.insert(CONTENT_TYPE, content_type.clone());
        }
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|value| value.to_str().ok())
    }

    #[test]
    fn header_names_collide_case_insensitively() {
        let config = ClientConfig::new()
            .with_header("Authorization", "Bearer a")
            .and_then(|config| config.with_header("authorization", "Bearer b"))
            .expect("valid headers");
        assert_eq!(config.headers.len(), 1);
        assert_eq!(header(&config.headers, "AUTHORIZATION"), Some("Bearer b"));
    }

    #[test]
    fn rejects_malformed_header_names_and_values() {
        let err = ClientConfig::new()
            .with_header("Bad Header", "v")
            .expect_err("space in name");
        assert!(matches!(err, SyncError::InvalidHeader { ref name, .. } if name == "Bad Header"));

        assert!(RequestOptions::new().header("x-ok", "line\nbreak").is_err());
        assert!(RequestOptions::new().content_type("text/\r\nplain").is_err());
    }

    #[test]
    fn per_call_headers_win_over_base_and_defaults() {
        let config = ClientConfig::new()
            .with_header("X-Tenant", "base")
            .and_then(|config| config.with_header("Accept", APPLICATION_JSON))
            .expect("valid headers");
        let options = RequestOptions::new()
            .content_type("text/csv")
            .and_then(|options| options.header("x-tenant", "call"))
            .expect("valid options");

        let headers = config.request_headers(Method::Post, &options);
        assert_eq!(header(&headers, "x-tenant"), Some("call"));
        assert_eq!(header(&headers, "content-type"), Some("text/csv"));
        assert_eq!(header(&headers, "accept"), Some(APPLICATION_JSON));
        assert_eq!(header(&config.headers, "x-tenant"), Some("base"));
    }

    #[test]
    fn get_and_delete_default_to_json_content_type() {
        let config = ClientConfig::new()
            .with_header("Content-Type", "text/plain")
            .expect("valid header");
        let none = RequestOptions::new();
        assert_eq!(
            header(&config.request_headers(Method::Get, &none), "content-type"),
            Some(APPLICATION_JSON)
        );
        assert_eq!(
            header(&config.request_headers(Method::Delete, &none), "content-type"),
            Some(APPLICATION_JSON)
        );
        assert_eq!(
            header(&config.request_headers(Method::Put, &none), "content-type"),
            Some("text/plain")
        );
    }

    #[test]
    fn resolves_relative_targets_under_base_path() {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:8080/api")
            .expect("base url");
        assert_eq!(
            config.resolve("todos/3").expect("resolve").as_str(),
            "http://localhost:8080/api/todos/3"
        );
        assert_eq!(
            config.resolve("/health").expect("resolve").as_str(),
            "http://localhost:8080/health"
        );
        assert_eq!(
            config
                .resolve("https://other.example/items")
                .expect("resolve")
                .as_str(),
            "https://other.example/items"
        );
    }

    #[test]
    fn relative_target_without_base_is_invalid() {
        let err = ClientConfig::new().resolve("todos").expect_err("must fail");
        assert!(matches!(err, SyncError::InvalidTarget { .. }));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(ClientConfig::new().with_base_url("not a url").is_err());
    }
}
