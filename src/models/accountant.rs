use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accountant {
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
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountantDraft {
    pub name: String,
    pub email: String,
    pub city: String,
    pub mobile_number: String,
    pub password: String,
}
