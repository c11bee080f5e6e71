//! Orders placed at checkout.
//!
//! An order snapshots product name, variant weight and unit price at creation
//! time, so its totals never drift when catalog prices change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderNumber, OrderStatus, Price, ProductId, UserId, VariantId};

fn default_country() -> String {
    "India".to_string()
}

/// Shipping address embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

impl Address {
    /// Names of required fields that are blank.
    ///
    /// `country` is optional and defaults to India.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether every required field is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub variant_id: VariantId,
    pub variant_weight: String,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Price,
    /// `price × quantity`.
    pub total: Price,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razorpay_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razorpay_payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razorpay_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether `user_id` placed this order.
    #[must_use]
    pub fn belongs_to(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Record a verified payment and move the order to `confirmed`.
    pub fn confirm_payment(&mut self, payment_id: &str, signature: &str) {
        self.status = OrderStatus::Confirmed;
        self.payment_id = Some(payment_id.to_string());
        self.razorpay_payment_id = Some(payment_id.to_string());
        self.razorpay_signature = Some(signature.to_string());
        self.updated_at = Utc::now();
    }

    /// Overwrite the status. Any status may follow any other.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_missing_fields() {
        let address: Address =
            serde_json::from_str(r#"{"street":"12 MG Road","city":"Pune","phone":" "}"#).unwrap();
        assert_eq!(address.missing_fields(), vec!["state", "pincode", "phone"]);
        assert_eq!(address.country, "India");
        assert!(!address.is_complete());
    }

    #[test]
    fn test_address_complete() {
        let address: Address = serde_json::from_str(
            r#"{"street":"12 MG Road","city":"Pune","state":"MH","pincode":"411001","country":"India","phone":"9999999999"}"#,
        )
        .unwrap();
        assert!(address.is_complete());
    }

    #[test]
    fn test_payment_fields_omitted_until_set() {
        let json = serde_json::json!({
            "id": "o1",
            "orderNumber": "DDF12345678ABCD",
            "userId": "u1",
            "items": [],
            "subtotal": 100,
            "shipping": 50,
            "tax": 5,
            "total": 155,
            "shippingAddress": {"street": "s", "city": "c", "state": "st", "pincode": "1", "phone": "2"},
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let mut order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        let out = serde_json::to_value(&order).unwrap();
        assert!(out.get("razorpayPaymentId").is_none());

        order.confirm_payment("pay_1", "sig");
        assert_eq!(order.status, OrderStatus::Confirmed);
        let out = serde_json::to_value(&order).unwrap();
        assert_eq!(out["razorpayPaymentId"], "pay_1");
        assert_eq!(out["status"], "confirmed");
    }
}
