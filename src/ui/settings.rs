use crossterm::event::KeyCode;
use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::api::ApiError;
use crate::fetch::Loadable;
use crate::forms::{parse_amount, Entity, EntityForm, FormOutcome, MutationKind};
use crate::models::{Accountant, Admin, Customer, WalletTopUp};
use crate::session::Role;
use crate::ui::components::form::{handle_form_key, render_form, FormAction};
use crate::ui::components::popup::{centered_rect, render_error, render_success};

pub const MISSING_USER_ID: &str =
    "No user id is stored for this session. Please log out and log in again.";

/// The signed-in user's own record
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Admin(Admin),
    Accountant(Accountant),
    Customer(Customer),
}

impl Profile {
    fn lines(&self) -> Vec<(&'static str, String)> {
        match self {
            Profile::Admin(a) => vec![
                ("Name", a.name.clone()),
                ("Email", a.email.clone()),
                ("Mobile Number", a.mobile_number.clone()),
            ],
            Profile::Accountant(a) => vec![
                ("Name", a.name.clone()),
                ("Email", a.email.clone()),
                ("City", a.city.clone()),
                ("Mobile Number", a.mobile_number.clone()),
            ],
            Profile::Customer(c) => vec![
                ("Name", c.name.clone()),
                ("Email", c.email.clone()),
                ("City", c.city.clone()),
                ("Mobile Number", c.mobile_number.clone()),
                (
                    "Wallet Balance",
                    super::money(c.wallet_balance.unwrap_or(Decimal::ZERO)),
                ),
            ],
        }
    }

    fn edit_form(&self) -> EntityForm {
        match self {
            Profile::Admin(a) => EntityForm::edit_admin(a),
            Profile::Accountant(a) => EntityForm::edit_accountant(a),
            Profile::Customer(c) => EntityForm::edit_customer(c),
        }
    }

    fn updated(&self, form: &EntityForm) -> Profile {
        match self {
            Profile::Admin(a) => Profile::Admin(form.updated_admin(a)),
            Profile::Accountant(a) => Profile::Accountant(form.updated_accountant(a)),
            Profile::Customer(c) => Profile::Customer(form.updated_customer(c)),
        }
    }

    fn entity(&self) -> Entity {
        match self {
            Profile::Admin(_) => Entity::Admin,
            Profile::Accountant(_) => Entity::Accountant,
            Profile::Customer(_) => Entity::Customer,
        }
    }
}

pub enum SettingsAction {
    Save(Profile),
    TopUp(String, Decimal),
}

pub struct SettingsState {
    pub role: Role,
    pub user_id: Option<String>,
    pub profile: Loadable<Profile>,
    pub form: Option<EntityForm>,
    pending: Option<Profile>,
    /// Amount being typed for a wallet top-up
    pub wallet_input: Option<String>,
    pub wallet_error: Option<String>,
    pub topping_up: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl SettingsState {
    pub fn new(role: Role, user_id: Option<String>) -> Self {
        Self {
            role,
            user_id,
            profile: Loadable::Loading,
            form: None,
            pending: None,
            wallet_input: None,
            wallet_error: None,
            topping_up: false,
            notice: None,
            error: None,
        }
    }

    pub fn loaded(&mut self, result: Result<Profile, String>) {
        self.profile = Loadable::from_result(result);
    }

    pub fn saved(&mut self, result: Result<(), ApiError>) {
        let Some(profile) = self.pending.take() else {
            return;
        };
        match FormOutcome::from_result(profile.entity(), MutationKind::Update, &result) {
            FormOutcome::Done(_) => {
                self.profile = Loadable::Ready(profile);
                self.form = None;
                self.notice = Some("Profile updated successfully".to_string());
            }
            FormOutcome::Rejected(err) => {
                if let Some(form) = &mut self.form {
                    form.submitting = false;
                    form.error = Some(err.message);
                }
            }
        }
    }

    pub fn topped_up(&mut self, result: Result<WalletTopUp, ApiError>) {
        self.topping_up = false;
        match result {
            Ok(top_up) => {
                if let (Some(balance), Some(Profile::Customer(customer))) =
                    (top_up.wallet_balance, self.profile.ready_mut())
                {
                    customer.wallet_balance = Some(balance);
                }
                self.wallet_input = None;
                self.notice = Some(
                    top_up
                        .message
                        .unwrap_or_else(|| "Wallet updated successfully".to_string()),
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet top-up failed");
                self.wallet_error = Some("Failed to add money to the wallet. Please try again.".to_string());
            }
        }
    }
}

pub fn render_settings<B: Backend>(f: &mut Frame<B>, area: Rect, state: &mut SettingsState) {
    if state.user_id.is_none() {
        let message = Paragraph::new(MISSING_USER_ID)
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Settings"));
        f.render_widget(message, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    let title = format!("{} Settings", state.role.title());
    if let Some(profile) = super::render_loadable(f, chunks[0], &title, &state.profile) {
        let text: Vec<Spans> = profile
            .lines()
            .into_iter()
            .map(|(label, value)| {
                Spans::from(vec![
                    Span::styled(format!("{label}: "), Style::default().fg(Color::Yellow)),
                    Span::raw(value),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title)),
            chunks[0],
        );
    }

    let help = if state.role == Role::Customer {
        "<E> Edit Profile | <W> Add Money to Wallet | <Tab> Menu"
    } else {
        "<E> Edit Profile | <Tab> Menu"
    };
    super::render_help(f, chunks[1], help);

    if let Some(form) = &state.form {
        render_form(f, area, form);
    }
    if let Some(amount) = &state.wallet_input {
        render_wallet(f, area, amount, state.wallet_error.as_deref(), state.topping_up);
    }
    if let Some(notice) = &state.notice {
        render_success(f, area, notice);
    }
    if let Some(error) = &state.error {
        render_error(f, area, error);
    }
}

fn render_wallet<B: Backend>(f: &mut Frame<B>, area: Rect, amount: &str, error: Option<&str>, busy: bool) {
    let popup = centered_rect(40, 30, area);
    let mut text = vec![
        Spans::from(format!("Amount: {amount}|")),
        Spans::from(""),
    ];
    if busy {
        text.push(Spans::from(Span::styled("Adding...", Style::default().fg(Color::Gray))));
    } else if let Some(error) = error {
        text.push(Spans::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }
    text.push(Spans::from("<Enter> Add  <Esc> Cancel"));

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Add Money")),
        popup,
    );
}

pub fn handle_input(state: &mut SettingsState, key: KeyCode) -> Option<SettingsAction> {
    if state.notice.take().is_some() || state.error.take().is_some() {
        return None;
    }
    let user_id = state.user_id.clone()?;

    if let Some(amount) = &mut state.wallet_input {
        if state.topping_up {
            return None;
        }
        match key {
            KeyCode::Esc => {
                state.wallet_input = None;
                state.wallet_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => amount.push(c),
            KeyCode::Backspace => {
                amount.pop();
            }
            KeyCode::Enter => match parse_amount(amount) {
                Ok(value) => {
                    state.wallet_error = None;
                    state.topping_up = true;
                    return Some(SettingsAction::TopUp(user_id, value));
                }
                Err(message) => state.wallet_error = Some(message),
            },
            _ => {}
        }
        return None;
    }

    if let Some(form) = &mut state.form {
        return match handle_form_key(form, key)? {
            FormAction::Cancel => {
                state.form = None;
                None
            }
            FormAction::Submit => {
                let profile = state.profile.ready()?.updated(form);
                form.submitting = true;
                state.pending = Some(profile.clone());
                Some(SettingsAction::Save(profile))
            }
        };
    }

    match key {
        KeyCode::Char('e') => {
            if let Some(profile) = state.profile.ready() {
                state.form = Some(profile.edit_form());
            }
        }
        KeyCode::Char('w') if state.role == Role::Customer => {
            state.wallet_input = Some(String::new());
            state.wallet_error = None;
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            id: 42,
            name: "Meera".into(),
            email: "meera@example.com".into(),
            city: "Goa".into(),
            mobile_number: "99".into(),
            password: "pw".into(),
            wallet_balance: Some(Decimal::from(10)),
            created_date: None,
        }
    }

    fn type_keys(state: &mut SettingsState, keys: &str) {
        for c in keys.chars() {
            handle_input(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn missing_id_sends_nothing() {
        let mut state = SettingsState::new(Role::Admin, None);
        assert!(handle_input(&mut state, KeyCode::Char('e')).is_none());
        assert!(state.form.is_none());
    }

    #[test]
    fn wallet_top_up_needs_a_positive_amount() {
        let mut state = SettingsState::new(Role::Customer, Some("42".into()));
        state.loaded(Ok(Profile::Customer(customer())));

        handle_input(&mut state, KeyCode::Char('w'));
        type_keys(&mut state, "0");
        assert!(handle_input(&mut state, KeyCode::Enter).is_none());
        assert!(state.wallet_error.is_some());

        type_keys(&mut state, "5");
        match handle_input(&mut state, KeyCode::Enter) {
            Some(SettingsAction::TopUp(id, amount)) => {
                assert_eq!(id, "42");
                assert_eq!(amount, Decimal::from(5));
            }
            _ => panic!("expected a top-up"),
        }

        state.topped_up(Ok(WalletTopUp {
            wallet_balance: Some(Decimal::from(15)),
            message: None,
        }));
        match state.profile.ready() {
            Some(Profile::Customer(c)) => assert_eq!(c.wallet_balance, Some(Decimal::from(15))),
            other => panic!("unexpected profile {other:?}"),
        }
        assert!(state.wallet_input.is_none());
    }

    #[test]
    fn profile_edit_saves_the_full_record() {
        let mut state = SettingsState::new(Role::Customer, Some("42".into()));
        state.loaded(Ok(Profile::Customer(customer())));

        handle_input(&mut state, KeyCode::Char('e'));
        state.form.as_mut().unwrap().set_value("City", "Pune");
        let action = handle_input(&mut state, KeyCode::Char('s'));
        let Some(SettingsAction::Save(Profile::Customer(updated))) = action else {
            panic!("expected a save");
        };
        assert_eq!(updated.id, 42);
        assert_eq!(updated.city, "Pune");
        assert_eq!(updated.wallet_balance, Some(Decimal::from(10)));

        state.saved(Ok(()));
        assert!(state.form.is_none());
        assert!(matches!(state.profile.ready(), Some(Profile::Customer(c)) if c.city == "Pune"));
    }
}
