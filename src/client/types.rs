//! Request payloads for the payment endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payer details attached to a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number (for mobile-money channels, the paying wallet)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of the create-payment call.
///
/// # Example
///
/// ```
/// use paygate::client::{CreatePayment, Customer};
///
/// let payment = CreatePayment::new(
///     1500,
///     "ORD1",
///     "mobile",
///     "Order #1",
///     Customer { phone: Some("255700000000".into()), ..Customer::default() },
/// )
/// .with_expires_in(900);
///
/// let json = serde_json::to_value(&payment).unwrap();
/// assert_eq!(json["merchantOrderId"], "ORD1");
/// assert_eq!(json["expires_in"], 900);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePayment {
    /// Amount to charge
    pub amount: u64,
    /// Merchant-side order reference, used later to query status
    #[serde(rename = "merchantOrderId")]
    pub merchant_order_id: String,
    /// Payment channel identifier
    pub channel: String,
    /// Free-text description shown to the payer
    pub purpose: String,
    /// Payer details
    pub customer: Customer,
    /// Seconds until the payment request lapses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Arbitrary merchant data echoed back in notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl CreatePayment {
    /// Creates a payment without expiry or metadata.
    #[must_use]
    pub fn new(
        amount: u64,
        merchant_order_id: impl Into<String>,
        channel: impl Into<String>,
        purpose: impl Into<String>,
        customer: Customer,
    ) -> Self {
        Self {
            amount,
            merchant_order_id: merchant_order_id.into(),
            channel: channel.into(),
            purpose: purpose.into(),
            customer,
            expires_in: None,
            metadata: None,
        }
    }

    /// Sets the lifetime of the payment request in seconds.
    #[must_use]
    pub const fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Attaches merchant metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_are_omitted() {
        let payment = CreatePayment::new(100, "ORD1", "card", "test", Customer::default());

        let json = serde_json::to_value(&payment).unwrap();

        assert_eq!(
            json,
            json!({
                "amount": 100,
                "merchantOrderId": "ORD1",
                "channel": "card",
                "purpose": "test",
                "customer": {}
            })
        );
    }

    #[test]
    fn metadata_and_expiry_are_included_when_set() {
        let payment = CreatePayment::new(100, "ORD1", "card", "test", Customer::default())
            .with_expires_in(60)
            .with_metadata(json!({"cart": 7}));

        let json = serde_json::to_value(&payment).unwrap();

        assert_eq!(json["expires_in"], 60);
        assert_eq!(json["metadata"], json!({"cart": 7}));
    }
}
