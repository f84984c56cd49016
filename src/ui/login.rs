use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::api::ApiError;
use crate::forms::EntityForm;
use crate::models::Credentials;
use crate::session::Role;
use crate::ui::components::form::{handle_form_key, render_form, FormAction};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub enum LoginAction {
    Back,
    Submit(Role, Credentials),
}

pub struct LoginState {
    pub role: Role,
    pub form: EntityForm,
}

impl LoginState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            form: EntityForm::login(&format!("{} Login", role.title())),
        }
    }

    /// A refused login keeps the typed email and shows one message for every cause
    pub fn fail(&mut self, err: &ApiError) {
        tracing::warn!(role = %self.role, error = %err, "login failed");
        self.form.submitting = false;
        self.form.set_value("Password", "");
        self.form.error = Some(INVALID_CREDENTIALS.to_string());
    }
}

pub fn render_login<B: Backend>(f: &mut Frame<B>, state: &mut LoginState) {
    let size = f.size();
    render_form(f, size, &state.form);
}

pub fn handle_input(state: &mut LoginState, key: KeyCode) -> Option<LoginAction> {
    match handle_form_key(&mut state.form, key)? {
        FormAction::Cancel => Some(LoginAction::Back),
        FormAction::Submit => {
            state.form.submitting = true;
            Some(LoginAction::Submit(state.role, state.form.credentials()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_login_shows_invalid_credentials() {
        let mut state = LoginState::new(Role::Customer);
        state.form.set_value("Email", "c@example.com");
        state.form.set_value("Password", "wrong");

        let action = handle_input(&mut state, KeyCode::Char('s'));
        assert!(matches!(action, Some(LoginAction::Submit(Role::Customer, _))));

        state.fail(&ApiError::Unauthorized);
        assert_eq!(state.form.error.as_deref(), Some(INVALID_CREDENTIALS));
        assert_eq!(state.form.value("Email"), "c@example.com");
        assert_eq!(state.form.value("Password"), "");
    }
}
