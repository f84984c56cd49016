use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}
