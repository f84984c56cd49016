//! Client for the billing API.
//!
//! One method per endpoint the console uses. Every method returns an
//! [`ApiError`] that keeps business rejections (duplicate email, insufficient
//! wallet balance) apart from transport and server failures, so screens can
//! show the right message. Nothing here retries.

mod error;

pub use error::{ApiError, ApiResult, INSUFFICIENT_BALANCE};

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::invoice_form::CreateInvoiceRequest;
use crate::models::{
    Accountant, AccountantDraft, Admin, ContactMessage, Credentials, Customer, CustomerDraft,
    DailySales, Invoice, InvoiceAck, LoginResponse, Product, ProductDraft, StatKey, WalletReceipt,
    WalletTopUp,
};
use crate::session::Role;

use error::message_from_body;

/// Billing API client. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BillingClient {
    inner: Arc<BillingClientInner>,
}

struct BillingClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl BillingClient {
    /// Create a client for the API at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(BillingClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    // Auth

    pub async fn login(&self, role: Role, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let path = match role {
            Role::Admin => "/api/admin/login",
            Role::Accountant => "/api/accountant/login",
            Role::Customer => "/api/users/login",
        };
        self.post_json(path, credentials).await
    }

    // Analysis

    pub async fn stat(&self, key: StatKey) -> ApiResult<Decimal> {
        let value: serde_json::Value = self.get(key.path()).await?;
        scalar_from_value(&value)
    }

    pub async fn daily_sales(&self) -> ApiResult<Vec<DailySales>> {
        self.get("/analysis/dailySales").await
    }

    // Customers

    pub async fn list_customers(&self) -> ApiResult<Vec<Customer>> {
        self.get("/api/users/displayCus").await
    }

    pub async fn customer_info(&self, id: &str) -> ApiResult<Customer> {
        self.get(&format!("/api/users/customerinfo/{id}")).await
    }

    /// A duplicate email comes back as [`ApiError::Conflict`]
    pub async fn create_customer(&self, draft: &CustomerDraft) -> ApiResult<()> {
        self.send_json(reqwest::Method::POST, "/api/users/createCustomer", draft)
            .await
    }

    pub async fn update_customer(&self, customer: &Customer) -> ApiResult<()> {
        let path = format!("/api/users/updateCustomer/{}", customer.id);
        self.send_json(reqwest::Method::PUT, &path, customer).await
    }

    pub async fn delete_customer(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/users/deleteCus/{id}")).await
    }

    // Accountants

    pub async fn list_accountants(&self) -> ApiResult<Vec<Accountant>> {
        self.get("/api/admin/displayAcc").await
    }

    pub async fn accountant_info(&self, id: &str) -> ApiResult<Accountant> {
        self.get(&format!("/api/admin/accountantinfo/{id}")).await
    }

    pub async fn create_accountant(&self, draft: &AccountantDraft) -> ApiResult<()> {
        self.send_json(reqwest::Method::POST, "/api/admin/createAccountant", draft)
            .await
    }

    pub async fn update_accountant(&self, accountant: &Accountant) -> ApiResult<()> {
        let path = format!("/api/admin/updateAccountant/{}", accountant.id);
        self.send_json(reqwest::Method::PUT, &path, accountant).await
    }

    // Admin profile

    pub async fn admin_details(&self, id: &str) -> ApiResult<Admin> {
        self.get(&format!("/api/admin/getAdminDetails/{id}")).await
    }

    pub async fn update_admin(&self, admin: &Admin) -> ApiResult<()> {
        let path = format!("/api/admin/updateAdmin/{}", admin.id);
        self.send_json(reqwest::Method::PUT, &path, admin).await
    }

    // Products

    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.get("/api/admin/viewallproducts").await
    }

    pub async fn add_product(&self, draft: &ProductDraft) -> ApiResult<()> {
        self.send_json(reqwest::Method::POST, "/api/admin/addProducts", draft)
            .await
    }

    pub async fn update_product(&self, product: &Product) -> ApiResult<()> {
        let path = format!("/api/admin/updateProduct/{}", product.id);
        self.send_json(reqwest::Method::PUT, &path, product).await
    }

    pub async fn delete_product(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/admin/deleteProduct/{id}")).await
    }

    // Invoices

    pub async fn list_invoices(&self) -> ApiResult<Vec<Invoice>> {
        self.get("/api/accountant/getAllInvoice").await
    }

    /// Invoices of one customer. The endpoint answers with `{"message": ...}`
    /// instead of a list when it has nothing to show; that becomes an error
    /// carrying the message.
    pub async fn customer_invoices(&self, customer_id: &str) -> ApiResult<Vec<Invoice>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum InvoicesOrMessage {
            Invoices(Vec<Invoice>),
            Message { message: String },
        }

        match self.get(&format!("/invoice/{customer_id}")).await? {
            InvoicesOrMessage::Invoices(invoices) => Ok(invoices),
            InvoicesOrMessage::Message { message } => Err(ApiError::Status {
                status: 200,
                message,
            }),
        }
    }

    /// Form-encoded; the answer is only an acknowledgement
    pub async fn create_invoice(&self, request: &CreateInvoiceRequest) -> ApiResult<InvoiceAck> {
        let url = self.url("/api/accountant/createInvoice");
        tracing::debug!(customer_id = request.customer_id, "POST createInvoice");
        let response = self
            .inner
            .client
            .post(&url)
            .form(&request.form_fields())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    pub async fn delete_invoice(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/accountant/deleteInvoice/{id}"))
            .await
    }

    // Wallet

    /// Debit the customer's wallet for one invoice.
    ///
    /// A message containing [`INSUFFICIENT_BALANCE`] is a refusal even when
    /// it arrives with a 2xx status.
    pub async fn pay_invoice(&self, customer_id: i64, invoice_id: i64) -> ApiResult<WalletReceipt> {
        let url = self.url("/wallet");
        tracing::debug!(customer_id, invoice_id, "POST wallet debit");
        let response = self
            .inner
            .client
            .post(&url)
            .query(&[("customerId", customer_id), ("invoiceId", invoice_id)])
            .json(&serde_json::json!({
                "customerId": customer_id,
                "invoiceId": invoice_id,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let message = message_from_body(&body);

        if message.contains(INSUFFICIENT_BALANCE) {
            return Err(ApiError::InsufficientBalance(message));
        }
        if !status.is_success() {
            return Err(Self::error_for_status(status.as_u16(), message));
        }

        Ok(WalletReceipt { message })
    }

    pub async fn add_to_wallet(&self, customer_id: &str, amount: Decimal) -> ApiResult<WalletTopUp> {
        let url = self.url(&format!("/{customer_id}/add-to-wallet"));
        tracing::debug!(customer_id, %amount, "POST wallet credit");
        let response = self
            .inner
            .client
            .post(&url)
            .query(&[("amount", amount.to_string())])
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // Contact

    pub async fn send_contact(&self, message: &ContactMessage) -> ApiResult<()> {
        self.send_json(reqwest::Method::POST, "/contactus", message)
            .await
    }

    // Plumbing

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        tracing::debug!(path, "GET");
        let response = self.inner.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    async fn post_json<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        tracing::debug!(path, "POST");
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Send a JSON body and ignore whatever comes back on success
    async fn send_json<B: serde::Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> ApiResult<()> {
        tracing::debug!(%method, path, "send");
        let response = self
            .inner
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        tracing::debug!(path, "DELETE");
        let response = self.inner.client.delete(self.url(path)).send().await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let error = Self::error_for_status(status, message_from_body(&body));
        tracing::warn!(status, error = %error, "billing API request failed");
        error
    }

    fn error_for_status(status: u16, message: String) -> ApiError {
        match status {
            409 => ApiError::Conflict(message),
            401 | 403 => ApiError::Unauthorized,
            _ => ApiError::Status { status, message },
        }
    }
}

impl std::fmt::Debug for BillingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Analysis endpoints answer with a bare number (occasionally quoted)
fn scalar_from_value(value: &serde_json::Value) -> ApiResult<Decimal> {
    let parsed = match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string())),
        serde_json::Value::String(s) => Decimal::from_str(s.trim()),
        serde_json::Value::Null => Ok(Decimal::ZERO),
        other => return Err(ApiError::Parse(format!("expected a number, got {other}"))),
    };
    parsed.map_err(|e| ApiError::Parse(format!("invalid number: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_from_numbers_and_strings() {
        assert_eq!(scalar_from_value(&json!(12)).unwrap(), Decimal::from(12));
        assert_eq!(
            scalar_from_value(&json!(1234.5)).unwrap(),
            Decimal::from_str("1234.5").unwrap()
        );
        assert_eq!(
            scalar_from_value(&json!("99.90")).unwrap(),
            Decimal::from_str("99.90").unwrap()
        );
        assert_eq!(scalar_from_value(&json!(null)).unwrap(), Decimal::ZERO);
        assert!(scalar_from_value(&json!({"total": 1})).is_err());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            BillingClient::error_for_status(409, "dup".into()),
            ApiError::Conflict(m) if m == "dup"
        ));
        assert!(matches!(
            BillingClient::error_for_status(403, String::new()),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            BillingClient::error_for_status(500, "boom".into()),
            ApiError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn base_url_is_normalised() {
        let client = BillingClient::new("http://localhost:8094/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8094");
        assert_eq!(client.url("/contactus"), "http://localhost:8094/contactus");
    }
}
