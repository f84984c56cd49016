use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Product;

/// One row of the invoice form. Only lives while the form is open.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: Option<i64>,
    pub quantity: u32,
    /// Copy of the product price taken when the product was picked
    pub price: Decimal,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            product_id: None,
            quantity: 1,
            price: Decimal::ZERO,
        }
    }
}

impl LineItem {
    /// `None` when the amount does not fit in a `Decimal`
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceFormError {
    #[error("Select a client")]
    NoCustomer,

    #[error("Add at least one item")]
    NoItems,

    #[error("Select a product for item {0}")]
    ProductMissing(usize),

    #[error("The invoice total is too large")]
    TotalOverflow,
}

/// State of the invoice creation form
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceForm {
    customer_id: Option<i64>,
    items: Vec<LineItem>,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceForm {
    /// A fresh form starts with one empty item
    pub fn new() -> Self {
        Self {
            customer_id: None,
            items: vec![LineItem::default()],
        }
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.customer_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn select_customer(&mut self, customer_id: Option<i64>) {
        self.customer_id = customer_id;
    }

    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::default());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn select_product(&mut self, index: usize, product: &Product) {
        if let Some(item) = self.items.get_mut(index) {
            item.product_id = Some(product.id);
            item.price = product.price;
        }
    }

    /// Quantities below one are raised to one
    pub fn set_quantity(&mut self, index: usize, quantity: u32) {
        if let Some(item) = self.items.get_mut(index) {
            item.quantity = quantity.max(1);
        }
    }

    /// Running total shown while editing, `None` on overflow
    pub fn total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.amount()?))
    }

    /// Check required fields and flatten into the create request
    pub fn to_request(&self) -> Result<CreateInvoiceRequest, InvoiceFormError> {
        let customer_id = self.customer_id.ok_or(InvoiceFormError::NoCustomer)?;
        if self.items.is_empty() {
            return Err(InvoiceFormError::NoItems);
        }

        let mut product_ids = Vec::with_capacity(self.items.len());
        let mut quantities = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            let product_id = item
                .product_id
                .ok_or(InvoiceFormError::ProductMissing(index + 1))?;
            product_ids.push(product_id);
            quantities.push(item.quantity.max(1));
        }
        if self.total().is_none() {
            return Err(InvoiceFormError::TotalOverflow);
        }

        Ok(CreateInvoiceRequest {
            customer_id,
            product_ids,
            quantities,
        })
    }
}

/// `createInvoice` payload: parallel id and quantity lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInvoiceRequest {
    pub customer_id: i64,
    pub product_ids: Vec<i64>,
    pub quantities: Vec<u32>,
}

impl CreateInvoiceRequest {
    /// Form fields with comma-joined lists
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("customerId", self.customer_id.to_string()),
            ("productIds", join(&self.product_ids)),
            ("quantities", join(&self.quantities)),
        ]
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(id: i64, price: &str) -> Product {
        Product {
            id,
            prod_name: format!("P{id}"),
            prod_description: String::new(),
            product_category: String::new(),
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn new_form_has_one_blank_item() {
        let form = InvoiceForm::new();
        assert_eq!(form.items().len(), 1);
        assert_eq!(form.items()[0].quantity, 1);
        assert_eq!(form.total(), Some(Decimal::ZERO));
    }

    #[test]
    fn picking_a_product_copies_its_price() {
        let mut form = InvoiceForm::new();
        form.select_product(0, &product(3, "12.50"));
        form.set_quantity(0, 4);

        assert_eq!(form.items()[0].product_id, Some(3));
        assert_eq!(form.total(), Some(Decimal::from(50)));
    }

    #[test]
    fn quantity_never_drops_below_one() {
        let mut form = InvoiceForm::new();
        form.set_quantity(0, 0);
        assert_eq!(form.items()[0].quantity, 1);
    }

    #[test]
    fn request_flattens_into_comma_lists() {
        let mut form = InvoiceForm::new();
        form.select_customer(Some(9));
        form.select_product(0, &product(3, "1"));
        let second = form.add_item();
        form.select_product(second, &product(5, "2"));
        form.set_quantity(second, 2);

        let request = form.to_request().unwrap();
        assert_eq!(
            request.form_fields(),
            [
                ("customerId", "9".to_string()),
                ("productIds", "3,5".to_string()),
                ("quantities", "1,2".to_string()),
            ]
        );
    }

    #[test]
    fn required_fields_are_enforced() {
        let mut form = InvoiceForm::new();
        assert_eq!(form.to_request(), Err(InvoiceFormError::NoCustomer));

        form.select_customer(Some(1));
        assert_eq!(form.to_request(), Err(InvoiceFormError::ProductMissing(1)));

        form.remove_item(0);
        assert_eq!(form.to_request(), Err(InvoiceFormError::NoItems));
    }

    #[test]
    fn oversized_amounts_are_refused_not_panicked_on() {
        let mut form = InvoiceForm::new();
        form.select_customer(Some(1));
        form.select_product(0, &product(3, "79228162514264337593543950335"));
        form.set_quantity(0, 10);

        assert_eq!(form.items()[0].amount(), None);
        assert_eq!(form.total(), None);
        assert_eq!(form.to_request(), Err(InvoiceFormError::TotalOverflow));

        let mut form = InvoiceForm::new();
        form.select_product(0, &product(3, "79228162514264337593543950335"));
        let second = form.add_item();
        form.select_product(second, &product(4, "79228162514264337593543950335"));
        assert!(form.items()[0].amount().is_some());
        assert_eq!(form.total(), None);
    }
}
