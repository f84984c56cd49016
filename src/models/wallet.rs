use rust_decimal::Decimal;
use serde::Deserialize;

/// Answer to a wallet debit
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WalletReceipt {
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub message: String,
}

/// Answer to a wallet credit
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTopUp {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub wallet_balance: Option<Decimal>,
    #[serde(default)]
    pub message: Option<String>,
}
