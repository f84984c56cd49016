mod accountant;
mod admin;
mod auth;
mod contact;
mod customer;
mod invoice;
mod product;
mod stats;
mod wallet;

pub use accountant::{Accountant, AccountantDraft};
pub use admin::Admin;
pub use auth::{Credentials, LoginResponse};
pub use contact::ContactMessage;
pub use customer::{Customer, CustomerDraft};
pub use invoice::{Invoice, InvoiceAck, InvoiceCustomer, PaymentStatus};
pub use product::{Product, ProductDraft};
pub use stats::{DailySales, StatKey};
pub use wallet::{WalletReceipt, WalletTopUp};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Parse the API's date strings, which are either `YYYY-MM-DD` or a full
/// timestamp starting with one
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Treat a JSON `null` text field as empty
pub(crate) fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids arrive as numbers from some endpoints and as strings from others
pub(crate) fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected id {other}"))),
    }
}

pub(crate) mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_date))
    }

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }
}
