//! Layout-free model of a generated invoice.
//!
//! [`build_document`] turns the invoice form and the lists the screen already
//! fetched into an [`InvoiceDocument`]. Renderers in `invoice_gen` draw it.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::invoice_form::InvoiceForm;
use crate::models::{Customer, Product};

pub const TITLE: &str = "Invoice";
pub const PRODUCT_NOT_FOUND: &str = "Product: Not Found";
pub const CUSTOMER_UNAVAILABLE: &str = "Client information is not available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invoice amounts are too large to total")]
pub struct AmountOverflow;

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerBlock {
    pub name: String,
    pub email: String,
    pub address: String,
    pub mobile: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentRow {
    Resolved {
        name: String,
        quantity: u32,
        unit_price: Decimal,
        line_total: Decimal,
    },
    /// Product id that matched nothing; shown with a marker, left out of the total
    Unresolved {
        product_id: Option<i64>,
        quantity: u32,
    },
}

impl DocumentRow {
    pub fn line_total(&self) -> Option<Decimal> {
        match self {
            DocumentRow::Resolved { line_total, .. } => Some(*line_total),
            DocumentRow::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, DocumentRow::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub title: String,
    pub reference: Option<i64>,
    pub issued_on: Option<NaiveDate>,
    pub customer: Option<CustomerBlock>,
    pub rows: Vec<DocumentRow>,
    pub grand_total: Decimal,
}

impl InvoiceDocument {
    /// Server-assigned invoice id, when the acknowledgement carried one
    pub fn with_reference(mut self, reference: Option<i64>) -> Self {
        self.reference = reference;
        self
    }

    pub fn issued_on(mut self, date: NaiveDate) -> Self {
        self.issued_on = Some(date);
        self
    }

    pub fn unresolved_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_resolved()).count()
    }
}

/// Two decimal places, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(quantity: u32, unit_price: Decimal) -> Result<Decimal, AmountOverflow> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .map(round_money)
        .ok_or(AmountOverflow)
}

pub fn build_document(
    form: &InvoiceForm,
    customers: &[Customer],
    products: &[Product],
) -> Result<InvoiceDocument, AmountOverflow> {
    let customer = form
        .customer_id()
        .and_then(|id| customers.iter().find(|c| c.id == id))
        .map(|c| CustomerBlock {
            name: c.name.clone(),
            email: c.email.clone(),
            address: c.city.clone(),
            mobile: c.mobile_number.clone(),
        });

    let rows = form
        .items()
        .iter()
        .map(|item| -> Result<DocumentRow, AmountOverflow> {
            let product = item
                .product_id
                .and_then(|id| products.iter().find(|p| p.id == id));
            Ok(match product {
                Some(product) => DocumentRow::Resolved {
                    name: product.prod_name.clone(),
                    quantity: item.quantity,
                    unit_price: product.price,
                    line_total: line_total(item.quantity, product.price)?,
                },
                None => DocumentRow::Unresolved {
                    product_id: item.product_id,
                    quantity: item.quantity,
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let grand_total = rows
        .iter()
        .filter_map(DocumentRow::line_total)
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line))
        .ok_or(AmountOverflow)?;

    Ok(InvoiceDocument {
        title: TITLE.to_string(),
        reference: None,
        issued_on: None,
        customer,
        rows,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(id: i64, name: &str, price: &str) -> Product {
        Product {
            id,
            prod_name: name.into(),
            prod_description: String::new(),
            product_category: String::new(),
            price: dec(price),
        }
    }

    fn customer(id: i64) -> Customer {
        Customer {
            id,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            city: "Pune".into(),
            mobile_number: "98200".into(),
            password: String::new(),
            wallet_balance: None,
            created_date: None,
        }
    }

    #[test]
    fn line_totals_round_half_away_from_zero() {
        assert_eq!(line_total(3, dec("0.335")), Ok(dec("1.01")));
        assert_eq!(line_total(1, dec("2.675")), Ok(dec("2.68")));
        assert_eq!(line_total(2, dec("10")), Ok(dec("20")));
        assert_eq!(line_total(7, dec("1.4285")), Ok(dec("10.00")));
    }

    #[test]
    fn document_totals_only_resolved_rows() {
        let products = [product(1, "Pen", "2.50"), product(2, "Ink", "0.335")];
        let mut form = InvoiceForm::new();
        form.select_customer(Some(5));
        form.select_product(0, &products[0]);
        form.set_quantity(0, 4);
        let ink = form.add_item();
        form.select_product(ink, &products[1]);
        form.set_quantity(ink, 3);
        let ghost = form.add_item();
        form.select_product(ghost, &product(99, "Gone", "1000"));

        let doc = build_document(&form, &[customer(5)], &products).unwrap();

        assert_eq!(doc.title, TITLE);
        assert_eq!(doc.customer.as_ref().map(|c| c.address.as_str()), Some("Pune"));
        assert_eq!(doc.rows.len(), 3);
        assert_eq!(doc.rows[0].line_total(), Some(dec("10.00")));
        assert_eq!(doc.rows[1].line_total(), Some(dec("1.01")));
        assert_eq!(
            doc.rows[2],
            DocumentRow::Unresolved {
                product_id: Some(99),
                quantity: 1
            }
        );
        assert_eq!(doc.unresolved_count(), 1);
        assert_eq!(doc.grand_total, dec("11.01"));
    }

    #[test]
    fn missing_customer_leaves_block_empty() {
        let mut form = InvoiceForm::new();
        form.select_customer(Some(404));

        let doc = build_document(&form, &[customer(5)], &[]).unwrap();

        assert!(doc.customer.is_none());
        assert_eq!(doc.grand_total, Decimal::ZERO);
        assert_eq!(doc.unresolved_count(), 1);
    }

    #[test]
    fn unit_price_comes_from_the_product_list() {
        let mut form = InvoiceForm::new();
        form.select_product(0, &product(1, "Pen", "1.00"));
        form.set_quantity(0, 2);

        let doc = build_document(&form, &[], &[product(1, "Pen", "1.25")]).unwrap();

        assert_eq!(doc.grand_total, dec("2.50"));
    }

    #[test]
    fn amounts_past_the_decimal_range_are_an_error() {
        let huge = product(1, "Gold", "79228162514264337593543950335");
        assert_eq!(line_total(10, huge.price), Err(AmountOverflow));

        let mut form = InvoiceForm::new();
        form.select_product(0, &huge);
        form.set_quantity(0, 10);
        assert_eq!(build_document(&form, &[], &[huge.clone()]), Err(AmountOverflow));

        let mut form = InvoiceForm::new();
        form.select_product(0, &huge);
        let second = form.add_item();
        form.select_product(second, &huge);
        assert_eq!(build_document(&form, &[], &[huge]), Err(AmountOverflow));
    }
}
