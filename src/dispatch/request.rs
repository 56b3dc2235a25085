//! Logical request description and its encoding into an [`HttpRequest`].

use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use url::Url;

use crate::error::Error;
use crate::transport::HttpRequest;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Request payload, in exactly one encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Bytes sent as-is; the caller is responsible for `Content-Type`.
    Raw(Vec<u8>),
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
    /// `application/json` document.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Builds a form body from name/value pairs.
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the value cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Content type implied by the encoding, if any.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Raw(_) => None,
            Self::Form(_) => Some(FORM_CONTENT_TYPE),
            Self::Json(_) => Some(JSON_CONTENT_TYPE),
        }
    }

    /// Encodes the body into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if JSON serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Raw(bytes) => Ok(bytes.clone()),
            Self::Form(pairs) => Ok(url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish()
                .into_bytes()),
            Self::Json(value) => Ok(serde_json::to_vec(value)?),
        }
    }
}

/// A logical API call before authentication and dispatch.
///
/// The target is either an absolute `http(s)` URL or a path that is
/// appended to the client's base URL (keeping any path the base carries).
///
/// # Example
///
/// ```
/// use paygate::dispatch::{RequestBody, RequestSpec};
/// use url::Url;
///
/// let base = Url::parse("https://pay.example.com/api").unwrap();
/// let spec = RequestSpec::get("/live/transaction-list")
///     .with_query("limit", "10")
///     .with_query("page", "1");
///
/// let request = spec.resolve(&base).unwrap();
/// assert_eq!(
///     request.url.as_str(),
///     "https://pay.example.com/api/live/transaction-list?limit=10&page=1"
/// );
///
/// let form = RequestSpec::post("/live/transaction-status")
///     .with_body(RequestBody::form([("merchantOrderId", "ORD1")]));
/// assert_eq!(form.resolve(&base).unwrap().body.unwrap(), b"merchantOrderId=ORD1");
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,
    /// Absolute URL or path relative to the base URL
    pub target: String,
    /// Caller-supplied headers
    pub headers: HeaderMap,
    /// Query parameters appended to the URL, in order
    pub query: Vec<(String, String)>,
    /// Optional payload
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    /// Creates a request with no headers, query or body.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Sets a header, replacing any existing values for that name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all caller headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns true if the target is an absolute `http` or `https` URL.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        let target = self.target.to_ascii_lowercase();
        target.starts_with("http://") || target.starts_with("https://")
    }

    /// Computes the full URL for this request against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the result is not a valid URL.
    pub fn url(&self, base: &Url) -> Result<Url, Error> {
        let raw = if self.is_absolute() {
            self.target.clone()
        } else {
            format!(
                "{}/{}",
                base.as_str().trim_end_matches('/'),
                self.target.trim_start_matches('/')
            )
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("invalid request URL '{raw}': {e}")))?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }

    /// Encodes this spec into a transport request.
    ///
    /// The body's content type is added unless the caller already set
    /// `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an invalid URL and
    /// [`Error::Encode`] if the body cannot be serialized.
    pub fn resolve(&self, base: &Url) -> Result<HttpRequest, Error> {
        let mut headers = self.headers.clone();
        let request = HttpRequest::new(self.method.clone(), self.url(base)?);

        let Some(body) = &self.body else {
            return Ok(request.with_headers(headers));
        };

        if let Some(content_type) = body.content_type() {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        Ok(request.with_headers(headers).with_body(body.encode()?))
    }
}
