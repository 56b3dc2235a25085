//! Conversion of command arguments into request payloads.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use serde_json::Value;

use crate::client::{CreatePayment, Customer};
use crate::dispatch::{RequestBody, RequestSpec};

use super::cli::{CreatePaymentArgs, RequestArgs};
use super::error::ConfigError;

/// Builds the payment body for `create-payment`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidJson`] if `--metadata` is not valid JSON.
pub fn create_payment(args: &CreatePaymentArgs) -> Result<CreatePayment, ConfigError> {
    let customer = Customer {
        name: args.customer_name.clone(),
        email: args.customer_email.clone(),
        phone: args.customer_phone.clone(),
    };

    let mut payment = CreatePayment::new(
        args.amount,
        args.order_id.clone(),
        args.channel.clone(),
        args.purpose.clone(),
        customer,
    );

    if let Some(seconds) = args.expires_in {
        payment = payment.with_expires_in(seconds);
    }
    if let Some(ref metadata) = args.metadata {
        payment = payment.with_metadata(parse_json("metadata", metadata)?);
    }

    Ok(payment)
}

/// Builds the request for `request`.
///
/// # Errors
///
/// Returns an error if the method, a header, a form field or the JSON body is invalid.
pub fn request_spec(args: &RequestArgs) -> Result<RequestSpec, ConfigError> {
    let method = args
        .method
        .to_ascii_uppercase()
        .parse::<Method>()
        .map_err(|_| ConfigError::InvalidMethod(args.method.clone()))?;

    let mut spec =
        RequestSpec::new(method, args.path.clone()).with_headers(parse_headers(&args.headers)?);

    if let Some(ref json) = args.json {
        spec = spec.with_body(RequestBody::Json(parse_json("json", json)?));
    } else if !args.form.is_empty() {
        let pairs = args
            .form
            .iter()
            .map(|pair| parse_pair("form field", pair))
            .collect::<Result<Vec<_>, _>>()?;
        spec = spec.with_body(RequestBody::form(pairs));
    }

    Ok(spec)
}

/// Parses `Key=Value` or `Key: Value` header strings.
///
/// Later headers with the same name replace earlier ones.
///
/// # Errors
///
/// Returns an error if a string has no separator or the name or value is invalid.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for header_str in raw {
        let (name, value) = parse_pair("header", header_str)?;
        let header_name = parse_header_name(&name)?;
        let header_value = parse_header_value(&name, &value)?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

fn parse_json(field: &'static str, raw: &str) -> Result<Value, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJson { field, source })
}

fn parse_pair(kind: &'static str, s: &str) -> Result<(String, String), ConfigError> {
    // "Key=Value" or "Key: Value", split at whichever separator comes first
    let Some(at) = s.find(['=', ':']) else {
        return Err(ConfigError::InvalidPair {
            kind,
            value: s.to_string(),
        });
    };

    let (name, value) = (&s[..at], &s[at + 1..]);
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
