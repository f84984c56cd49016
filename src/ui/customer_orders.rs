use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::Invoice;
use crate::ui::orders::{render_detail, InvoiceTable};

pub const MISSING_CUSTOMER_ID: &str =
    "No customer id is stored for this session. Please log out and log in again.";

/// The customer's home page lists invoices with a pay action; order history is read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerView {
    Dashboard,
    History,
}

pub enum CustomerOrderAction {
    Refresh,
    Pay(Invoice),
}

pub struct CustomerOrdersState {
    pub view: CustomerView,
    pub customer_id: Option<String>,
    pub table: InvoiceTable,
    pub detail: bool,
}

impl CustomerOrdersState {
    pub fn new(view: CustomerView, customer_id: Option<String>) -> Self {
        Self {
            view,
            customer_id,
            table: InvoiceTable::new(),
            detail: false,
        }
    }

    pub fn can_pay(&self, invoice: &Invoice) -> bool {
        self.view == CustomerView::Dashboard && !invoice.is_paid()
    }
}

pub fn render_customer_orders<B: Backend>(f: &mut Frame<B>, area: Rect, state: &mut CustomerOrdersState) {
    if state.customer_id.is_none() {
        let message = Paragraph::new(MISSING_CUSTOMER_ID)
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(message, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    let (title, help) = match state.view {
        CustomerView::Dashboard => (
            "My Orders",
            "<P> Pay | <Enter> Details | </> Search | <F> Status | <R> Refresh | <Tab> Menu",
        ),
        CustomerView::History => (
            "Order History",
            "<Enter> Details | </> Search | <F> Status | <R> Refresh | <Tab> Menu",
        ),
    };
    state.table.render(f, chunks[0], title);
    super::render_help(f, chunks[1], help);

    if state.detail {
        if let Some(invoice) = state.table.selected() {
            render_detail(f, area, invoice);
        }
    }
}

pub fn handle_input(state: &mut CustomerOrdersState, key: KeyCode) -> Option<CustomerOrderAction> {
    if state.customer_id.is_none() {
        return None;
    }

    if state.detail {
        if matches!(key, KeyCode::Esc | KeyCode::Enter) {
            state.detail = false;
        }
        return None;
    }

    if state.table.handle_key(key) {
        return None;
    }

    match key {
        KeyCode::Enter if state.table.selected().is_some() => state.detail = true,
        KeyCode::Char('r') => return Some(CustomerOrderAction::Refresh),
        KeyCode::Char('p') => {
            let invoice = state.table.selected()?;
            if state.can_pay(invoice) {
                return Some(CustomerOrderAction::Pay(invoice.clone()));
            }
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceCustomer, PaymentStatus};
    use rust_decimal::Decimal;

    fn scenario_invoice() -> Invoice {
        Invoice {
            id: 1,
            customer: InvoiceCustomer {
                id: 42,
                name: "A".into(),
                email: String::new(),
            },
            total_amount: Decimal::ONE_HUNDRED,
            invoice_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            payment_status: PaymentStatus::Unpaid,
            payment_date: None,
        }
    }

    #[test]
    fn customer_42_sees_one_payable_row() {
        let mut state = CustomerOrdersState::new(CustomerView::Dashboard, Some("42".into()));
        state.table.loaded(Ok(vec![scenario_invoice()]));

        let rows = state.table.visible();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer.name, "A");
        assert!(state.can_pay(rows[0]));

        match handle_input(&mut state, KeyCode::Char('p')) {
            Some(CustomerOrderAction::Pay(invoice)) => assert_eq!(invoice.id, 1),
            _ => panic!("expected the pay action"),
        }
    }

    #[test]
    fn history_is_read_only() {
        let mut state = CustomerOrdersState::new(CustomerView::History, Some("42".into()));
        state.table.loaded(Ok(vec![scenario_invoice()]));
        assert!(handle_input(&mut state, KeyCode::Char('p')).is_none());
    }

    #[test]
    fn missing_id_blocks_the_view() {
        let mut state = CustomerOrdersState::new(CustomerView::Dashboard, None);
        assert!(handle_input(&mut state, KeyCode::Char('r')).is_none());
    }
}
