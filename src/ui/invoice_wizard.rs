use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::ApiError;
use crate::fetch::Loadable;
use crate::invoice_doc::{build_document, InvoiceDocument};
use crate::invoice_form::{CreateInvoiceRequest, InvoiceForm};
use crate::models::{Customer, InvoiceAck, Product};
use crate::ui::components::popup::{centered_rect, render_error, render_success};

/// What the selection list is choosing
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PickTarget {
    Customer,
    Product(usize),
}

pub struct Picker {
    target: PickTarget,
    list_state: ListState,
}

pub enum InvoiceWizardAction {
    Reload,
    Submit(CreateInvoiceRequest),
}

pub struct InvoiceWizardState {
    pub customers: Loadable<Vec<Customer>>,
    pub products: Loadable<Vec<Product>>,
    pub form: InvoiceForm,
    items_list_state: ListState,
    picker: Option<Picker>,
    // (index, digits typed so far)
    quantity_input: Option<(usize, String)>,
    pub submitting: bool,
    pub show_error: Option<String>,
    pub show_success: Option<String>,
}

impl InvoiceWizardState {
    pub fn new() -> Self {
        let mut items_list_state = ListState::default();
        items_list_state.select(Some(0));
        Self {
            customers: Loadable::Loading,
            products: Loadable::Loading,
            form: InvoiceForm::new(),
            items_list_state,
            picker: None,
            quantity_input: None,
            submitting: false,
            show_error: None,
            show_success: None,
        }
    }

    fn selected_item(&self) -> Option<usize> {
        self.items_list_state
            .selected()
            .filter(|i| *i < self.form.items().len())
    }

    fn customer_name(&self) -> Option<&str> {
        let id = self.form.customer_id()?;
        self.customers
            .ready()?
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    fn product_name(&self, id: Option<i64>) -> Option<&str> {
        let id = id?;
        self.products
            .ready()?
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.prod_name.as_str())
    }

    fn open_picker(&mut self, target: PickTarget) {
        let len = match target {
            PickTarget::Customer => self.customers.ready().map_or(0, Vec::len),
            PickTarget::Product(_) => self.products.ready().map_or(0, Vec::len),
        };
        if len == 0 {
            self.show_error = Some("Nothing to choose from yet".to_string());
            return;
        }
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        self.picker = Some(Picker { target, list_state });
    }

    fn pick(&mut self, target: PickTarget, index: usize) {
        match target {
            PickTarget::Customer => {
                let id = self.customers.ready().and_then(|c| c.get(index)).map(|c| c.id);
                self.form.select_customer(id);
            }
            PickTarget::Product(item) => {
                if let Some(product) = self.products.ready().and_then(|p| p.get(index)).cloned() {
                    self.form.select_product(item, &product);
                }
            }
        }
    }

    fn add_item(&mut self) {
        let index = self.form.add_item();
        self.items_list_state.select(Some(index));
    }

    fn remove_item(&mut self) {
        if let Some(index) = self.selected_item() {
            self.form.remove_item(index);
            let len = self.form.items().len();
            self.items_list_state
                .select(if len == 0 { None } else { Some(index.min(len - 1)) });
        }
    }

    /// Handle the server's answer to `createInvoice`. The document is only
    /// built and exported once the server has acknowledged the invoice.
    pub fn created(
        &mut self,
        result: Result<InvoiceAck, ApiError>,
        export: impl FnOnce(&InvoiceDocument) -> Result<PathBuf>,
    ) {
        self.submitting = false;
        let ack = match result {
            Ok(ack) => ack,
            Err(err) => {
                tracing::warn!(error = %err, "invoice creation failed");
                self.show_error = Some("There was an error creating the invoice! Please try again.".to_string());
                return;
            }
        };

        let customers = self.customers.ready().map(Vec::as_slice).unwrap_or(&[]);
        let products = self.products.ready().map(Vec::as_slice).unwrap_or(&[]);
        let doc = match build_document(&self.form, customers, products) {
            Ok(doc) => doc
                .with_reference(ack.id)
                .issued_on(Local::now().date_naive()),
            Err(err) => {
                tracing::error!(error = %err, "invoice document could not be built");
                self.show_success = Some(format!(
                    "Invoice created successfully, but the file could not be saved: {err}"
                ));
                self.form = InvoiceForm::new();
                self.items_list_state.select(Some(0));
                return;
            }
        };

        if doc.unresolved_count() > 0 {
            tracing::warn!(unresolved = doc.unresolved_count(), "invoice has products missing from the catalogue");
        }

        match export(&doc) {
            Ok(path) => {
                self.show_success = Some(format!(
                    "Invoice created successfully. Saved to {}",
                    path.display()
                ));
            }
            Err(err) => {
                tracing::error!(error = %err, "invoice export failed");
                self.show_success = Some(format!(
                    "Invoice created successfully, but the file could not be saved: {err}"
                ));
            }
        }

        self.form = InvoiceForm::new();
        self.items_list_state.select(Some(0));
    }
}

impl Default for InvoiceWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_invoice_wizard<B: Backend>(f: &mut Frame<B>, area: Rect, state: &mut InvoiceWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let customer = match (&state.customers, state.customer_name()) {
        (Loadable::Loading, _) => "Loading customers...".to_string(),
        (Loadable::Failed(message), _) => format!("Could not load customers: {message}"),
        (_, Some(name)) => name.to_string(),
        (_, None) => "<none selected>".to_string(),
    };
    let customer = Paragraph::new(customer)
        .block(Block::default().borders(Borders::ALL).title("Client (C to choose)"));
    f.render_widget(customer, chunks[0]);

    let items: Vec<ListItem> = state
        .form
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let name = state
                .product_name(item.product_id)
                .unwrap_or("<choose a product>");
            let quantity = match &state.quantity_input {
                Some((index, digits)) if *index == i => format!("{digits}|"),
                _ => item.quantity.to_string(),
            };
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{:<30}", name), Style::default().fg(Color::White)),
                Span::raw(format!(" x {:<6}", quantity)),
                Span::styled(
                    format!(" {}", amount_text(item.amount())),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    let products_title = match &state.products {
        Loadable::Loading => "Items (loading products...)".to_string(),
        Loadable::Failed(message) => format!("Items (products unavailable: {message})"),
        Loadable::Ready(_) => "Items".to_string(),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(products_title))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut state.items_list_state);

    let total = Paragraph::new(Spans::from(vec![
        Span::raw("Total: "),
        Span::styled(
            amount_text(state.form.total()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(if state.submitting { "   Creating invoice..." } else { "" }),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(total, chunks[2]);

    super::render_help(
        f,
        chunks[3],
        "<C> Client | <A> Add item | <X> Remove | <P> Product | <Q> Quantity | <S> Create | <R> Reload",
    );

    if let Some(picker) = &mut state.picker {
        let names: Vec<String> = match picker.target {
            PickTarget::Customer => state
                .customers
                .ready()
                .map(|c| c.iter().map(|c| format!("{} <{}>", c.name, c.email)).collect())
                .unwrap_or_default(),
            PickTarget::Product(_) => state
                .products
                .ready()
                .map(|p| {
                    p.iter()
                        .map(|p| format!("{} ({})", p.prod_name, super::money(p.price)))
                        .collect()
                })
                .unwrap_or_default(),
        };
        let title = match picker.target {
            PickTarget::Customer => "Choose Client",
            PickTarget::Product(_) => "Choose Product",
        };
        let popup = centered_rect(60, 60, area);
        let list = List::new(names.into_iter().map(ListItem::new).collect::<Vec<_>>())
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(Clear, popup);
        f.render_stateful_widget(list, popup, &mut picker.list_state);
    }

    if let Some(error) = &state.show_error {
        render_error(f, area, error);
    }
    if let Some(message) = &state.show_success {
        render_success(f, area, message);
    }
}

fn amount_text(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| "too large".to_string(), super::money)
}

pub fn handle_input(state: &mut InvoiceWizardState, key: KeyCode) -> Option<InvoiceWizardAction> {
    if state.show_error.take().is_some() || state.show_success.take().is_some() {
        return None;
    }
    if state.submitting {
        return None;
    }

    if let Some(picker) = &mut state.picker {
        let len = match picker.target {
            PickTarget::Customer => state.customers.ready().map_or(0, Vec::len),
            PickTarget::Product(_) => state.products.ready().map_or(0, Vec::len),
        };
        match key {
            KeyCode::Down | KeyCode::Up => {
                let next = super::step(picker.list_state.selected(), len, key == KeyCode::Down);
                picker.list_state.select(next);
            }
            KeyCode::Enter => {
                let target = picker.target;
                let chosen = picker.list_state.selected();
                state.picker = None;
                if let Some(index) = chosen {
                    state.pick(target, index);
                }
            }
            KeyCode::Esc => state.picker = None,
            _ => {}
        }
        return None;
    }

    if let Some((index, digits)) = &mut state.quantity_input {
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => digits.push(c),
            KeyCode::Backspace => {
                digits.pop();
            }
            KeyCode::Enter => match digits.parse::<u32>() {
                Ok(quantity) if quantity >= 1 => {
                    let index = *index;
                    state.form.set_quantity(index, quantity);
                    state.quantity_input = None;
                }
                _ => {
                    state.show_error = Some(format!("Quantity must be between 1 and {}", u32::MAX));
                }
            },
            KeyCode::Esc => state.quantity_input = None,
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Down | KeyCode::Up => {
            let next = super::step(
                state.items_list_state.selected(),
                state.form.items().len(),
                key == KeyCode::Down,
            );
            state.items_list_state.select(next);
        }
        KeyCode::Char('c') => state.open_picker(PickTarget::Customer),
        KeyCode::Char('a') => state.add_item(),
        KeyCode::Char('x') => state.remove_item(),
        KeyCode::Char('p') => {
            if let Some(index) = state.selected_item() {
                state.open_picker(PickTarget::Product(index));
            }
        }
        KeyCode::Char('q') => {
            if let Some(index) = state.selected_item() {
                state.quantity_input = Some((index, String::new()));
            }
        }
        KeyCode::Char('r') => return Some(InvoiceWizardAction::Reload),
        KeyCode::Char('s') => match state.form.to_request() {
            Ok(request) => {
                state.submitting = true;
                return Some(InvoiceWizardAction::Submit(request));
            }
            Err(err) => state.show_error = Some(err.to_string()),
        },
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_state() -> InvoiceWizardState {
        let mut state = InvoiceWizardState::new();
        state.customers = Loadable::Ready(vec![Customer {
            id: 5,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            city: "Pune".into(),
            mobile_number: "98200".into(),
            password: String::new(),
            wallet_balance: None,
            created_date: None,
        }]);
        state.products = Loadable::Ready(vec![Product {
            id: 3,
            prod_name: "Pen".into(),
            prod_description: String::new(),
            product_category: String::new(),
            price: Decimal::new(250, 2),
        }]);
        state
    }

    fn press(state: &mut InvoiceWizardState, keys: &[KeyCode]) -> Option<InvoiceWizardAction> {
        let mut last = None;
        for key in keys {
            last = handle_input(state, *key);
        }
        last
    }

    #[test]
    fn build_and_submit_an_invoice() {
        let mut state = ready_state();
        let action = press(
            &mut state,
            &[
                KeyCode::Char('c'),
                KeyCode::Enter,
                KeyCode::Char('p'),
                KeyCode::Enter,
                KeyCode::Char('q'),
                KeyCode::Char('4'),
                KeyCode::Enter,
                KeyCode::Char('s'),
            ],
        );

        match action {
            Some(InvoiceWizardAction::Submit(request)) => {
                assert_eq!(request.customer_id, 5);
                assert_eq!(request.product_ids, vec![3]);
                assert_eq!(request.quantities, vec![4]);
            }
            _ => panic!("expected a submit"),
        }
        assert!(state.submitting);
        assert_eq!(state.form.total(), Some(Decimal::new(1000, 2)));
    }

    #[test]
    fn out_of_range_quantity_is_rejected_and_kept_open() {
        let mut state = ready_state();
        press(&mut state, &[KeyCode::Char('q')]);
        for c in "5000000000".chars() {
            handle_input(&mut state, KeyCode::Char(c));
        }
        handle_input(&mut state, KeyCode::Enter);

        assert_eq!(
            state.show_error.as_deref(),
            Some("Quantity must be between 1 and 4294967295")
        );
        assert_eq!(state.form.items()[0].quantity, 1);

        // dismiss, clear the digits and enter a valid one
        let mut keys = vec![KeyCode::Char(' ')];
        keys.extend(std::iter::repeat(KeyCode::Backspace).take(10));
        keys.extend([KeyCode::Char('7'), KeyCode::Enter]);
        press(&mut state, &keys);
        assert!(state.show_error.is_none());
        assert_eq!(state.form.items()[0].quantity, 7);
    }

    #[test]
    fn empty_or_zero_quantity_is_rejected() {
        let mut state = ready_state();
        press(&mut state, &[KeyCode::Char('q'), KeyCode::Enter]);
        assert!(state.show_error.is_some());

        press(&mut state, &[KeyCode::Esc, KeyCode::Char('0'), KeyCode::Enter]);
        assert!(state.show_error.is_some());
        assert_eq!(state.form.items()[0].quantity, 1);
    }

    #[test]
    fn oversized_price_blocks_submit_without_panicking() {
        let mut state = ready_state();
        if let Loadable::Ready(products) = &mut state.products {
            products[0].price = Decimal::MAX;
        }
        let action = press(
            &mut state,
            &[
                KeyCode::Char('c'),
                KeyCode::Enter,
                KeyCode::Char('p'),
                KeyCode::Enter,
                KeyCode::Char('q'),
                KeyCode::Char('9'),
                KeyCode::Enter,
                KeyCode::Char('s'),
            ],
        );

        assert!(action.is_none());
        assert_eq!(state.form.total(), None);
        assert_eq!(amount_text(state.form.total()), "too large");
        assert_eq!(
            state.show_error.as_deref(),
            Some("The invoice total is too large")
        );
    }

    #[test]
    fn incomplete_form_shows_an_error() {
        let mut state = ready_state();
        assert!(press(&mut state, &[KeyCode::Char('s')]).is_none());
        assert!(state.show_error.is_some());
    }

    #[test]
    fn export_runs_only_after_acknowledgement() {
        let mut state = ready_state();
        press(&mut state, &[KeyCode::Char('c'), KeyCode::Enter, KeyCode::Char('s')]);

        let mut exported = false;
        state.created(Err(ApiError::Unauthorized), |_| {
            exported = true;
            Ok(PathBuf::from("unused"))
        });
        assert!(!exported);
        assert!(state.show_error.is_some());

        let mut seen = None;
        state.created(
            Ok(InvoiceAck {
                id: Some(77),
                total_amount: None,
            }),
            |doc| {
                seen = Some(doc.clone());
                Ok(PathBuf::from("invoices/invoice_1.pdf"))
            },
        );
        let doc = seen.expect("document exported");
        assert_eq!(doc.reference, Some(77));
        assert_eq!(doc.customer.map(|c| c.name), Some("Asha".to_string()));
        assert!(state.show_success.is_some());
        assert_eq!(state.form.customer_id(), None);
    }
}
