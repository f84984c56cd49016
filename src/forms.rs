//! Create and edit forms for customers, accountants, products and profiles,
//! plus the classification of what a mutation request came back with.

use std::str::FromStr;

use crossterm::event::KeyCode;
use rust_decimal::Decimal;

use crate::api::ApiError;
use crate::models::{
    Accountant, AccountantDraft, Admin, ContactMessage, Credentials, Customer, CustomerDraft,
    Product, ProductDraft,
};

pub const CUSTOMER_EMAIL_TAKEN: &str = "A customer with this email already exists!";

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub masked: bool,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            required: true,
            masked: false,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    fn with(mut self, value: impl ToString) -> Self {
        self.value = value.to_string();
        self
    }

    /// What the form shows; masked fields never echo their value
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Whether the form makes a new record or edits the one with this id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityForm {
    pub entity: Entity,
    pub title: String,
    pub mode: FormMode,
    pub fields: Vec<FormField>,
    pub current_field: usize,
    pub editing: bool,
    pub error: Option<String>,
    pub submitting: bool,
}

impl EntityForm {
    fn new(entity: Entity, mode: FormMode, fields: Vec<FormField>) -> Self {
        let title = match mode {
            FormMode::Create => format!("Add {}", entity.title()),
            FormMode::Edit(_) => format!("Edit {}", entity.title()),
        };
        Self {
            entity,
            title,
            mode,
            fields,
            current_field: 0,
            editing: false,
            error: None,
            submitting: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, label: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.label == label) {
            field.value = value.to_string();
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.current_field = (self.current_field + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.current_field = (self.current_field + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        let Some(field) = self.fields.get_mut(self.current_field) else {
            return;
        };

        match key {
            KeyCode::Char(c) => field.value.push(c),
            KeyCode::Backspace => {
                field.value.pop();
            }
            _ => {}
        }
    }

    /// Labels of required fields that are still blank
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.value.trim().is_empty())
            .map(|f| f.label)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Check required fields before submitting; the error stays on the form
    pub fn validate(&mut self) -> bool {
        let missing = self.missing_required();
        if missing.is_empty() {
            self.error = None;
            true
        } else {
            self.error = Some(format!("Please fill in: {}", missing.join(", ")));
            false
        }
    }

    pub fn edit_id(&self) -> Option<i64> {
        match self.mode {
            FormMode::Edit(id) => Some(id),
            FormMode::Create => None,
        }
    }

    fn text(&self, label: &str) -> String {
        self.value(label).trim().to_string()
    }

    // Customers

    pub fn new_customer() -> Self {
        Self::new(
            Entity::Customer,
            FormMode::Create,
            vec![
                FormField::new("Name"),
                FormField::new("Email"),
                FormField::new("City"),
                FormField::new("Mobile Number"),
                FormField::new("Password").masked(),
            ],
        )
    }

    pub fn edit_customer(customer: &Customer) -> Self {
        Self::new(
            Entity::Customer,
            FormMode::Edit(customer.id),
            vec![
                FormField::new("Name").with(&customer.name),
                FormField::new("Email").with(&customer.email),
                FormField::new("City").with(&customer.city),
                FormField::new("Mobile Number").with(&customer.mobile_number),
                FormField::new("Password").optional().masked().with(&customer.password),
            ],
        )
    }

    pub fn customer_draft(&self) -> CustomerDraft {
        CustomerDraft {
            name: self.text("Name"),
            email: self.text("Email"),
            city: self.text("City"),
            mobile_number: self.text("Mobile Number"),
            password: self.value("Password").to_string(),
        }
    }

    /// Full record for the update call, starting from the stored one
    pub fn updated_customer(&self, original: &Customer) -> Customer {
        Customer {
            name: self.text("Name"),
            email: self.text("Email"),
            city: self.text("City"),
            mobile_number: self.text("Mobile Number"),
            password: self.value("Password").to_string(),
            ..original.clone()
        }
    }

    // Accountants

    pub fn new_accountant() -> Self {
        let mut form = Self::new_customer();
        form.entity = Entity::Accountant;
        form.title = format!("Add {}", Entity::Accountant.title());
        form
    }

    pub fn edit_accountant(accountant: &Accountant) -> Self {
        Self::new(
            Entity::Accountant,
            FormMode::Edit(accountant.id),
            vec![
                FormField::new("Name").with(&accountant.name),
                FormField::new("Email").with(&accountant.email),
                FormField::new("City").with(&accountant.city),
                FormField::new("Mobile Number").with(&accountant.mobile_number),
                FormField::new("Password").optional().masked().with(&accountant.password),
            ],
        )
    }

    pub fn accountant_draft(&self) -> AccountantDraft {
        AccountantDraft {
            name: self.text("Name"),
            email: self.text("Email"),
            city: self.text("City"),
            mobile_number: self.text("Mobile Number"),
            password: self.value("Password").to_string(),
        }
    }

    pub fn updated_accountant(&self, original: &Accountant) -> Accountant {
        Accountant {
            name: self.text("Name"),
            email: self.text("Email"),
            city: self.text("City"),
            mobile_number: self.text("Mobile Number"),
            password: self.value("Password").to_string(),
            ..original.clone()
        }
    }

    // Admin profile

    pub fn edit_admin(admin: &Admin) -> Self {
        Self::new(
            Entity::Admin,
            FormMode::Edit(admin.id),
            vec![
                FormField::new("Name").with(&admin.name),
                FormField::new("Email").with(&admin.email),
                FormField::new("Mobile Number").with(&admin.mobile_number),
                FormField::new("Password").optional().masked().with(&admin.password),
            ],
        )
    }

    pub fn updated_admin(&self, original: &Admin) -> Admin {
        Admin {
            name: self.text("Name"),
            email: self.text("Email"),
            mobile_number: self.text("Mobile Number"),
            password: self.value("Password").to_string(),
            ..original.clone()
        }
    }

    // Products

    pub fn new_product() -> Self {
        Self::new(
            Entity::Product,
            FormMode::Create,
            vec![
                FormField::new("Name"),
                FormField::new("Description").optional(),
                FormField::new("Category"),
                FormField::new("Price"),
            ],
        )
    }

    pub fn edit_product(product: &Product) -> Self {
        Self::new(
            Entity::Product,
            FormMode::Edit(product.id),
            vec![
                FormField::new("Name").with(&product.prod_name),
                FormField::new("Description").optional().with(&product.prod_description),
                FormField::new("Category").with(&product.product_category),
                FormField::new("Price").with(product.price),
            ],
        )
    }

    pub fn product_draft(&self) -> Result<ProductDraft, String> {
        Ok(ProductDraft {
            prod_name: self.text("Name"),
            prod_description: self.text("Description"),
            product_category: self.text("Category"),
            price: parse_price(self.value("Price"))?,
        })
    }

    pub fn updated_product(&self, original: &Product) -> Result<Product, String> {
        Ok(Product {
            prod_name: self.text("Name"),
            prod_description: self.text("Description"),
            product_category: self.text("Category"),
            price: parse_price(self.value("Price"))?,
            ..original.clone()
        })
    }

    // Login and contact

    pub fn login(heading: &str) -> Self {
        let mut form = Self::new(
            Entity::Credentials,
            FormMode::Create,
            vec![FormField::new("Email"), FormField::new("Password").masked()],
        );
        form.title = heading.to_string();
        form
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.text("Email"),
            password: self.value("Password").to_string(),
        }
    }

    pub fn contact() -> Self {
        let mut form = Self::new(
            Entity::Contact,
            FormMode::Create,
            vec![
                FormField::new("Name"),
                FormField::new("Email"),
                FormField::new("Message"),
            ],
        );
        form.title = "Contact Us".to_string();
        form
    }

    pub fn contact_message(&self) -> ContactMessage {
        ContactMessage {
            name: self.text("Name"),
            email: self.text("Email"),
            message: self.text("Message"),
        }
    }

    /// Empty every field, e.g. after a message went out
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.current_field = 0;
        self.editing = false;
        self.error = None;
        self.submitting = false;
    }
}

/// Non-negative price
pub fn parse_price(raw: &str) -> Result<Decimal, String> {
    match Decimal::from_str(raw.trim()) {
        Ok(price) if price >= Decimal::ZERO => Ok(price),
        _ => Err("Price must be a non-negative number".to_string()),
    }
}

/// Strictly positive amount, used for wallet top-ups
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    match Decimal::from_str(raw.trim()) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err("Please enter a valid amount".to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Customer,
    Accountant,
    Product,
    Admin,
    Invoice,
    Contact,
    Credentials,
}

impl Entity {
    pub fn title(&self) -> &'static str {
        match self {
            Entity::Customer => "Customer",
            Entity::Accountant => "Accountant",
            Entity::Product => "Product",
            Entity::Admin => "Admin",
            Entity::Invoice => "Invoice",
            Entity::Contact => "Message",
            Entity::Credentials => "Login",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Entity::Customer => "customer",
            Entity::Accountant => "accountant",
            Entity::Product => "product",
            Entity::Admin => "profile",
            Entity::Invoice => "invoice",
            Entity::Contact => "message",
            Entity::Credentials => "login",
        }
    }

    /// The noun with "A" or "An" in front, for sentence starts
    fn with_article(&self) -> String {
        let noun = self.noun();
        let article = if noun.starts_with(['a', 'e', 'i', 'o', 'u']) { "An" } else { "A" };
        format!("{article} {noun}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// A failed mutation as the user gets to see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationError {
    pub message: String,
    pub conflict: bool,
}

impl MutationError {
    pub fn classify(entity: Entity, kind: MutationKind, err: &ApiError) -> Self {
        if let (MutationKind::Create, ApiError::Conflict(_)) = (kind, err) {
            let message = match entity {
                Entity::Customer => CUSTOMER_EMAIL_TAKEN.to_string(),
                other => format!("{} with this email already exists!", other.with_article()),
            };
            return Self {
                message,
                conflict: true,
            };
        }

        let verb = match kind {
            MutationKind::Create => "adding",
            MutationKind::Update => "updating",
            MutationKind::Delete => "deleting",
        };
        Self {
            message: format!(
                "There was an error {verb} the {}! Please try again.",
                entity.noun()
            ),
            conflict: false,
        }
    }
}

/// What the screen does once a mutation answer is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Close the form and show a notice
    Done(String),
    /// Keep the form open with its values and show the error
    Rejected(MutationError),
}

impl FormOutcome {
    pub fn from_result<T>(entity: Entity, kind: MutationKind, result: &Result<T, ApiError>) -> Self {
        match result {
            Ok(_) => {
                let verb = match kind {
                    MutationKind::Create => "added",
                    MutationKind::Update => "updated",
                    MutationKind::Delete => "deleted",
                };
                FormOutcome::Done(format!("{} {verb} successfully", entity.title()))
            }
            Err(err) => {
                tracing::warn!(?entity, ?kind, error = %err, "mutation rejected");
                FormOutcome::Rejected(MutationError::classify(entity, kind, err))
            }
        }
    }
}

/// Answer to a create, update or delete, carried back to the owning screen
#[derive(Debug)]
pub enum Mutation<T> {
    /// `refreshed` is the list fetched again after a successful create
    Created {
        result: Result<(), ApiError>,
        refreshed: Option<Result<Vec<T>, String>>,
    },
    Updated {
        record: T,
        result: Result<(), ApiError>,
    },
    Deleted {
        id: i64,
        result: Result<(), ApiError>,
    },
}

/// A delete waiting for the user's `y`/`n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub entity: Entity,
    pub id: i64,
    pub label: String,
}

impl PendingDelete {
    pub fn new(entity: Entity, id: i64, label: impl Into<String>) -> Self {
        Self {
            entity,
            id,
            label: label.into(),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Delete {} \"{}\" (#{})? [y/n]",
            self.entity.noun(),
            self.label,
            self.id
        )
    }

    /// `Some(true)` to go ahead, `Some(false)` to drop it, `None` to keep asking
    pub fn answer(key: KeyCode) -> Option<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
            _ => None,
        }
    }
}
