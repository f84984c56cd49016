use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub prod_name: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub prod_description: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub product_category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `addProducts`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub prod_name: String,
    pub prod_description: String,
    pub product_category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}
