use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub name: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub email: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub mobile_number: String,
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub password: String,
}
