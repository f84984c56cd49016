use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::ApiError;
use crate::fetch::Loadable;
use crate::forms::{Entity, FormOutcome, MutationKind, PendingDelete};
use crate::listing::{ListView, StatusFilter};
use crate::models::Invoice;
use crate::ui::components::popup::{centered_rect, render_confirm, render_error, render_success};

pub const INVOICE_HEADERS: [&str; 6] = ["ID", "Customer", "Amount", "Date", "Status", "Paid On"];

pub fn invoice_widths() -> [Constraint; 6] {
    [
        Constraint::Length(6),
        Constraint::Percentage(25),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
    ]
}

pub fn invoice_row(invoice: &Invoice) -> Row<'static> {
    let status_color = if invoice.is_paid() {
        Color::Green
    } else {
        Color::Red
    };
    Row::new(vec![
        Span::raw(invoice.id.to_string()),
        Span::raw(invoice.customer.name.clone()),
        Span::raw(super::money(invoice.total_amount)),
        Span::raw(super::date(invoice.invoice_date)),
        Span::styled(
            invoice.payment_status.to_string(),
            Style::default().fg(status_color),
        ),
        Span::raw(super::date(invoice.payment_date)),
    ])
}

/// Invoice table filtered by text and status, shared by the staff and customer pages
pub struct InvoiceTable {
    pub invoices: Loadable<ListView<Invoice>>,
    pub status: StatusFilter,
    pub table_state: TableState,
    pub searching: bool,
}

impl InvoiceTable {
    pub fn new() -> Self {
        Self {
            invoices: Loadable::Loading,
            status: StatusFilter::All,
            table_state: TableState::default(),
            searching: false,
        }
    }

    pub fn loaded(&mut self, result: Result<Vec<Invoice>, String>) {
        self.invoices = Loadable::from_result(result.map(ListView::new));
        self.clamp();
    }

    pub fn visible(&self) -> Vec<&Invoice> {
        self.invoices
            .ready()
            .map(|view| view.visible_with(self.status))
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&Invoice> {
        let visible = self.visible();
        self.table_state.selected().and_then(|i| visible.get(i).copied())
    }

    fn clamp(&mut self) {
        let len = self.visible().len();
        let selected = match self.table_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    /// Search, status and selection keys; reports whether the key was used
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if self.searching {
            match key {
                KeyCode::Esc | KeyCode::Enter => self.searching = false,
                KeyCode::Char(c) => {
                    if let Some(view) = self.invoices.ready_mut() {
                        view.push_search(c);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(view) = self.invoices.ready_mut() {
                        view.pop_search();
                    }
                }
                _ => {}
            }
            self.clamp();
            return true;
        }

        match key {
            KeyCode::Down | KeyCode::Up => {
                let next = super::step(
                    self.table_state.selected(),
                    self.visible().len(),
                    key == KeyCode::Down,
                );
                self.table_state.select(next);
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('f') => {
                self.status = self.status.next();
                self.clamp();
            }
            _ => return false,
        }
        true
    }

    pub fn render<B: Backend>(&mut self, f: &mut Frame<B>, area: Rect, title: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)].as_ref())
            .split(area);

        let search = self
            .invoices
            .ready()
            .map(|v| v.search().to_string())
            .unwrap_or_default();
        let cursor = if self.searching { "|" } else { "" };
        let filters = Paragraph::new(Spans::from(vec![
            Span::raw(format!("{search}{cursor}")),
            Span::styled(
                format!("   Status: {}", self.status.label()),
                Style::default().fg(Color::Cyan),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Search (/) | Filter (F)"));
        f.render_widget(filters, chunks[0]);

        if super::render_loadable(f, chunks[1], title, &self.invoices).is_none() {
            return;
        }

        let rows: Vec<Row> = self.visible().into_iter().map(invoice_row).collect();
        let widths = invoice_widths();
        let table = Table::new(rows)
            .header(
                Row::new(INVOICE_HEADERS.to_vec())
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .widths(&widths)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }
}

impl Default for InvoiceTable {
    fn default() -> Self {
        Self::new()
    }
}

pub enum OrderAction {
    Refresh,
    Delete(i64),
}

pub struct OrdersState {
    pub can_delete: bool,
    pub table: InvoiceTable,
    pub detail: bool,
    pub pending_delete: Option<PendingDelete>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl OrdersState {
    pub fn new(can_delete: bool) -> Self {
        Self {
            can_delete,
            table: InvoiceTable::new(),
            detail: false,
            pending_delete: None,
            notice: None,
            error: None,
        }
    }

    pub fn deleted(&mut self, id: i64, result: Result<(), ApiError>) {
        match FormOutcome::from_result(Entity::Invoice, MutationKind::Delete, &result) {
            FormOutcome::Done(notice) => {
                if let Some(view) = self.table.invoices.ready_mut() {
                    view.remove(id);
                }
                self.table.clamp();
                self.notice = Some(notice);
            }
            FormOutcome::Rejected(err) => self.error = Some(err.message),
        }
    }
}

pub fn render_orders<B: Backend>(f: &mut Frame<B>, area: Rect, state: &mut OrdersState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    state.table.render(f, chunks[0], "Orders");

    let help = if state.can_delete {
        "<Enter> Details | <D> Delete | </> Search | <F> Status | <R> Refresh | <Tab> Menu"
    } else {
        "<Enter> Details | </> Search | <F> Status | <R> Refresh | <Tab> Menu"
    };
    super::render_help(f, chunks[1], help);

    if state.detail {
        if let Some(invoice) = state.table.selected() {
            render_detail(f, area, invoice);
        }
    }
    if let Some(pending) = &state.pending_delete {
        render_confirm(f, area, &pending.prompt());
    }
    if let Some(notice) = &state.notice {
        render_success(f, area, notice);
    }
    if let Some(error) = &state.error {
        render_error(f, area, error);
    }
}

pub fn render_detail<B: Backend>(f: &mut Frame<B>, area: Rect, invoice: &Invoice) {
    let popup = centered_rect(60, 50, area);
    let label = Style::default().fg(Color::Yellow);
    let line = |name: &str, value: String| {
        Spans::from(vec![Span::styled(format!("{name}: "), label), Span::raw(value)])
    };

    let text = vec![
        line("Invoice", format!("#{}", invoice.id)),
        line("Customer", invoice.customer.name.clone()),
        line("Email", invoice.customer.email.clone()),
        line("Amount", super::money(invoice.total_amount)),
        line("Invoice Date", super::date(invoice.invoice_date)),
        line("Status", invoice.payment_status.to_string()),
        line("Payment Date", super::date(invoice.payment_date)),
        Spans::from(""),
        Spans::from("Esc - Close"),
    ];

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Order Details")),
        popup,
    );
}

pub fn handle_input(state: &mut OrdersState, key: KeyCode) -> Option<OrderAction> {
    if state.notice.take().is_some() || state.error.take().is_some() {
        return None;
    }

    if let Some(pending) = &state.pending_delete {
        match PendingDelete::answer(key) {
            Some(true) => {
                let id = pending.id;
                state.pending_delete = None;
                return Some(OrderAction::Delete(id));
            }
            Some(false) => state.pending_delete = None,
            None => {}
        }
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
        KeyCode::Char('r') => return Some(OrderAction::Refresh),
        KeyCode::Char('d') if state.can_delete => {
            if let Some(invoice) = state.table.selected() {
                state.pending_delete = Some(PendingDelete::new(
                    Entity::Invoice,
                    invoice.id,
                    invoice.customer.name.clone(),
                ));
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

    fn invoice(id: i64, status: PaymentStatus) -> Invoice {
        Invoice {
            id,
            customer: InvoiceCustomer {
                id: 1,
                name: format!("Customer {id}"),
                email: String::new(),
            },
            total_amount: Decimal::ONE_HUNDRED,
            invoice_date: None,
            payment_status: status,
            payment_date: None,
        }
    }

    fn loaded(can_delete: bool) -> OrdersState {
        let mut state = OrdersState::new(can_delete);
        state.table.loaded(Ok(vec![
            invoice(1, PaymentStatus::Paid),
            invoice(2, PaymentStatus::Unpaid),
        ]));
        state
    }

    #[test]
    fn status_filter_cycles() {
        let mut state = loaded(false);
        handle_input(&mut state, KeyCode::Char('f'));
        assert_eq!(state.table.status, StatusFilter::Paid);
        assert_eq!(state.table.visible().len(), 1);
        handle_input(&mut state, KeyCode::Char('f'));
        assert_eq!(state.table.visible()[0].id, 2);
    }

    #[test]
    fn only_admins_delete() {
        let mut state = loaded(false);
        handle_input(&mut state, KeyCode::Char('d'));
        assert!(state.pending_delete.is_none());

        let mut state = loaded(true);
        handle_input(&mut state, KeyCode::Char('d'));
        assert!(matches!(
            handle_input(&mut state, KeyCode::Char('y')),
            Some(OrderAction::Delete(1))
        ));
        state.deleted(1, Ok(()));
        assert_eq!(state.table.visible().len(), 1);
    }

    #[test]
    fn enter_opens_details() {
        let mut state = loaded(false);
        handle_input(&mut state, KeyCode::Enter);
        assert!(state.detail);
        handle_input(&mut state, KeyCode::Esc);
        assert!(!state.detail);
    }
}
