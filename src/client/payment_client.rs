//! Endpoint callers for the payment API.

use std::time::{Duration, SystemTime};

use http::HeaderMap;
use http::header::{ACCEPT, AUTHORIZATION, HeaderName, HeaderValue};
use serde_json::Value;

use crate::auth::{AuthProvider, Token, bearer};
use crate::dispatch::{Dispatcher, RequestBody, RequestSpec};
use crate::error::Error;
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::transport::HttpClient;

use super::{ClientConfig, CreatePayment};

/// Header carrying the caller's idempotency key on payment creation.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const CREATE_PAYMENT_PATH: &str = "/initiate-payment";

/// Client for the remote payment API.
///
/// Every method takes `&self`, so one client can serve many concurrent
/// requests (wrap it in an `Arc` to share across tasks). Each request runs
/// its own retry loop.
///
/// # Type Parameters
///
/// - `H`: The HTTP transport
/// - `S`: The sleeper used between retries (defaults to [`TokioSleeper`])
/// - `C`: The clock used for token expiry (defaults to [`SystemClock`])
///
/// # Example
///
/// ```no_run
/// use paygate::client::{ClientConfig, CreatePayment, Customer, Environment, PaymentClient};
/// use paygate::transport::ReqwestClient;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new(Environment::Uat, Url::parse("https://pay.example.com")?)
///     .with_api_key("sk_test_123");
/// let client = PaymentClient::new(config, ReqwestClient::new());
///
/// let payment = CreatePayment::new(1000, "ORD1", "card", "Order 1", Customer::default());
/// let created = client.create_payment(&payment, Some("ORD1-attempt-1")).await?;
/// println!("{created}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PaymentClient<H, S = TokioSleeper, C = SystemClock> {
    config: ClientConfig,
    auth: AuthProvider,
    dispatcher: Dispatcher<H, S>,
    clock: C,
}

impl<H> PaymentClient<H> {
    /// Creates a client over the given transport.
    #[must_use]
    pub fn new(config: ClientConfig, transport: H) -> Self {
        let auth = AuthProvider::new(config.api_key().map(str::to_string));
        let dispatcher = Dispatcher::new(transport, config.retry_policy().clone());
        Self {
            config,
            auth,
            dispatcher,
            clock: SystemClock,
        }
    }
}

impl<H, S, C> PaymentClient<H, S, C> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> PaymentClient<H, S2, C> {
        PaymentClient {
            config: self.config,
            auth: self.auth,
            dispatcher: self.dispatcher.with_sleeper(sleeper),
            clock: self.clock,
        }
    }

    /// Sets a custom clock for token expiry checks.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> PaymentClient<H, S, C2> {
        PaymentClient {
            config: self.config,
            auth: self.auth,
            dispatcher: self.dispatcher,
            clock,
        }
    }

    /// Returns the client settings.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a snapshot of the cached token, if a login has happened.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.auth.token()
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> PaymentClient<H, S, C> {
    /// Obtains an access token with the OAuth password grant and caches it.
    ///
    /// The new token replaces any previous one. Concurrent logins are not
    /// serialized; the last one to finish wins.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if client id or secret is missing (no request is made)
    /// - [`Error::Authentication`] if the response carries no usable access token
    /// - any dispatch error from the login request
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, Error> {
        let (client_id, client_secret) = self.config.oauth_credentials()?;

        let spec = RequestSpec::post(self.config.scoped_path("login")).with_body(
            RequestBody::form([
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ]),
        );

        let body = self.send(spec, false).await?;
        let token = token_from_response(&body, self.clock.now())?;

        tracing::info!(
            environment = %self.config.environment(),
            "Login succeeded, token valid until {:?}",
            token.expires_at()
        );
        self.auth.store(token.clone());
        Ok(token)
    }

    /// Creates a payment.
    ///
    /// `idempotency_key`, when given, is passed through untouched in the
    /// `Idempotency-Key` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the idempotency key is not a valid
    /// header value, [`Error::Encode`] if the payment cannot be serialized,
    /// or any dispatch error.
    pub async fn create_payment(
        &self,
        payment: &CreatePayment,
        idempotency_key: Option<&str>,
    ) -> Result<Value, Error> {
        let mut spec =
            RequestSpec::post(CREATE_PAYMENT_PATH).with_body(RequestBody::json(payment)?);

        if let Some(key) = idempotency_key {
            let value = HeaderValue::from_str(key).map_err(|e| {
                Error::Configuration(format!("invalid idempotency key: {e}"))
            })?;
            spec = spec.with_header(HeaderName::from_static(IDEMPOTENCY_KEY_HEADER), value);
        }

        self.send(spec, true).await
    }

    /// Queries the status of a payment by merchant order id.
    ///
    /// # Errors
    ///
    /// Returns any dispatch error; an unknown order surfaces as
    /// [`Error::NotFound`] if the service answers 404.
    pub async fn transaction_status(&self, merchant_order_id: &str) -> Result<Value, Error> {
        let spec = RequestSpec::post(self.config.scoped_path("transaction-status"))
            .with_body(RequestBody::form([("merchantOrderId", merchant_order_id)]));

        self.send(spec, true).await
    }

    /// Lists transactions, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns any dispatch error.
    pub async fn transaction_list(&self, limit: u32, page: u32) -> Result<Value, Error> {
        let spec = RequestSpec::get(self.config.scoped_path("transaction-list"))
            .with_query("limit", limit.to_string())
            .with_query("page", page.to_string());

        self.send(spec, true).await
    }

    /// Sends an arbitrary request with the client's credentials.
    ///
    /// Relative targets resolve against the base URL without an
    /// environment prefix. Caller headers override the client's defaults,
    /// including `Authorization`.
    ///
    /// # Errors
    ///
    /// Returns any dispatch error.
    pub async fn request(&self, spec: RequestSpec) -> Result<Value, Error> {
        self.send(spec, true).await
    }

    async fn send(&self, spec: RequestSpec, authenticated: bool) -> Result<Value, Error> {
        let mut request = spec.resolve(self.config.base_url())?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if authenticated {
            match self.auth.authorization(self.clock.now()) {
                Some(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                None => tracing::debug!("No usable credential, sending request unauthenticated"),
            }
        }
        headers.extend(request.headers);
        request.headers = headers;

        self.dispatcher.dispatch(&request).await
    }
}

/// Builds a token from a login response.
fn token_from_response(body: &Value, now: SystemTime) -> Result<Token, Error> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            Error::Authentication("login response did not contain an access token".to_string())
        })?;

    if bearer(access_token).is_none() {
        return Err(Error::Authentication(
            "access token contains characters not allowed in a header".to_string(),
        ));
    }

    let expires_at = match body.get("expires_at").and_then(seconds) {
        Some(at) => SystemTime::UNIX_EPOCH.checked_add(at),
        None => {
            let lifetime = body
                .get("expires_in")
                .and_then(seconds)
                .unwrap_or(Duration::ZERO);
            now.checked_add(lifetime)
        }
    }
    .ok_or_else(|| Error::Authentication("token expiry is out of range".to_string()))?;

    Ok(Token::new(access_token, expires_at))
}

/// Reads a non-negative number of seconds from a JSON number or numeric string.
fn seconds(value: &Value) -> Option<Duration> {
    let secs = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Duration::try_from_secs_f64(secs).ok()
}
