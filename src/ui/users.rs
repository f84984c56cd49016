use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Tabs},
    Frame,
};

use crate::forms::{Entity, EntityForm, Mutation};
use crate::models::{Accountant, AccountantDraft, Customer, CustomerDraft};
use crate::session::Role;
use crate::ui::components::table::{CrudEvent, CrudTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersTab {
    Customers,
    Accountants,
}

pub enum UserAction {
    RefreshCustomers,
    RefreshAccountants,
    CreateCustomer(CustomerDraft),
    UpdateCustomer(Customer),
    DeleteCustomer(i64),
    CreateAccountant(AccountantDraft),
    UpdateAccountant(Accountant),
}

pub struct UsersState {
    pub role: Role,
    pub tab: UsersTab,
    pub customers: CrudTable<Customer>,
    pub accountants: CrudTable<Accountant>,
}

impl UsersState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            tab: UsersTab::Customers,
            customers: CrudTable::new(Entity::Customer),
            accountants: CrudTable::new(Entity::Accountant),
        }
    }

    /// Accountant records are managed by admins only
    pub fn shows_accountants(&self) -> bool {
        self.role == Role::Admin
    }

    fn overlay_open(&self) -> bool {
        let busy = |form: bool, pending: bool, searching: bool| form || pending || searching;
        match self.tab {
            UsersTab::Customers => busy(
                self.customers.form.is_some(),
                self.customers.pending_delete.is_some(),
                self.customers.searching,
            ),
            UsersTab::Accountants => busy(
                self.accountants.form.is_some(),
                self.accountants.pending_delete.is_some(),
                self.accountants.searching,
            ),
        }
    }
}

pub fn render_users<B: Backend>(f: &mut Frame<B>, area: Rect, state: &mut UsersState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let mut titles = vec![Spans::from("Customers")];
    if state.shows_accountants() {
        titles.push(Spans::from("Accountants"));
    }
    let selected = match state.tab {
        UsersTab::Customers => 0,
        UsersTab::Accountants => 1,
    };
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("Users"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(25),
        Constraint::Percentage(30),
        Constraint::Percentage(20),
        Constraint::Percentage(20),
    ];
    let headers = ["ID", "Name", "Email", "City", "Mobile"];

    match state.tab {
        UsersTab::Customers => state.customers.render(
            f,
            chunks[1],
            "Customers",
            &headers,
            &widths,
            |c| {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.email.clone(),
                    c.city.clone(),
                    c.mobile_number.clone(),
                ]
            },
        ),
        UsersTab::Accountants => state.accountants.render(
            f,
            chunks[1],
            "Accountants",
            &headers,
            &widths,
            |a| {
                vec![
                    a.id.to_string(),
                    a.name.clone(),
                    a.email.clone(),
                    a.city.clone(),
                    a.mobile_number.clone(),
                ]
            },
        ),
    }

    let help = match state.tab {
        UsersTab::Customers => "<N> New | <E> Edit | <D> Delete | </> Search | <R> Refresh | <Left/Right> Tab",
        UsersTab::Accountants => "<N> New | <E> Edit | </> Search | <R> Refresh | <Left/Right> Tab",
    };
    super::render_help(f, chunks[2], help);
}

pub fn handle_input(state: &mut UsersState, key: KeyCode) -> Option<UserAction> {
    if !state.overlay_open() && state.shows_accountants() {
        match key {
            KeyCode::Left | KeyCode::Right => {
                state.tab = match state.tab {
                    UsersTab::Customers => UsersTab::Accountants,
                    UsersTab::Accountants => UsersTab::Customers,
                };
                return None;
            }
            _ => {}
        }
    }

    match state.tab {
        UsersTab::Customers => handle_customers(state, key),
        UsersTab::Accountants => handle_accountants(state, key),
    }
}

fn handle_customers(state: &mut UsersState, key: KeyCode) -> Option<UserAction> {
    let table = &mut state.customers;
    match table.handle_key(key, |c| c.name.clone())? {
        CrudEvent::Refresh => Some(UserAction::RefreshCustomers),
        CrudEvent::New => {
            table.form = Some(EntityForm::new_customer());
            None
        }
        CrudEvent::Edit(customer) => {
            table.form = Some(EntityForm::edit_customer(&customer));
            None
        }
        CrudEvent::Delete(id) => Some(UserAction::DeleteCustomer(id)),
        CrudEvent::Submit => {
            let form = table.form.as_mut()?;
            let action = match form.edit_id() {
                None => UserAction::CreateCustomer(form.customer_draft()),
                Some(id) => {
                    let original = table.list.ready().and_then(|v| v.get(id)).cloned()?;
                    UserAction::UpdateCustomer(form.updated_customer(&original))
                }
            };
            form.submitting = true;
            Some(action)
        }
    }
}

fn handle_accountants(state: &mut UsersState, key: KeyCode) -> Option<UserAction> {
    let table = &mut state.accountants;
    // No delete endpoint for accountants
    if key == KeyCode::Char('d') && table.form.is_none() && !table.searching {
        return None;
    }

    match table.handle_key(key, |a| a.name.clone())? {
        CrudEvent::Refresh => Some(UserAction::RefreshAccountants),
        CrudEvent::New => {
            table.form = Some(EntityForm::new_accountant());
            None
        }
        CrudEvent::Edit(accountant) => {
            table.form = Some(EntityForm::edit_accountant(&accountant));
            None
        }
        CrudEvent::Delete(_) => None,
        CrudEvent::Submit => {
            let form = table.form.as_mut()?;
            let action = match form.edit_id() {
                None => UserAction::CreateAccountant(form.accountant_draft()),
                Some(id) => {
                    let original = table.list.ready().and_then(|v| v.get(id)).cloned()?;
                    UserAction::UpdateAccountant(form.updated_accountant(&original))
                }
            };
            form.submitting = true;
            Some(action)
        }
    }
}

pub fn apply_customers(state: &mut UsersState, mutation: Mutation<Customer>) {
    state.customers.apply(mutation);
}

pub fn apply_accountants(state: &mut UsersState, mutation: Mutation<Accountant>) {
    state.accountants.apply(mutation);
}
