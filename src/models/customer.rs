use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub name: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub email: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub city: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub mobile_number: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub password: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub wallet_balance: Option<Decimal>,
    #[serde(default, with = "super::lenient_date")]
    pub created_date: Option<NaiveDate>,
}

/// Body of `createCustomer`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub city: String,
    pub mobile_number: String,
    pub password: String,
}
