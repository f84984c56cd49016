use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::api::ApiError;
use crate::forms::EntityForm;
use crate::models::ContactMessage;
use crate::ui::components::form::{handle_form_key, render_form, FormAction};
use crate::ui::components::popup::render_success;

pub enum ContactAction {
    Back,
    Send(ContactMessage),
}

pub struct ContactState {
    pub form: EntityForm,
    pub notice: Option<String>,
}

impl ContactState {
    pub fn new() -> Self {
        Self {
            form: EntityForm::contact(),
            notice: None,
        }
    }

    /// Sent messages clear the form; failures keep what was typed
    pub fn finish(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.form.clear();
                self.notice = Some("Thanks! Your message has been sent.".to_string());
            }
            Err(err) => {
                tracing::warn!(error = %err, "contact message failed");
                self.form.submitting = false;
                self.form.error = Some("Your message could not be sent. Please try again.".to_string());
            }
        }
    }
}

impl Default for ContactState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_contact<B: Backend>(f: &mut Frame<B>, state: &mut ContactState) {
    let size = f.size();
    render_form(f, size, &state.form);

    if let Some(notice) = &state.notice {
        render_success(f, size, notice);
    }
}

pub fn handle_input(state: &mut ContactState, key: KeyCode) -> Option<ContactAction> {
    if state.notice.take().is_some() {
        return None;
    }

    match handle_form_key(&mut state.form, key)? {
        FormAction::Cancel => Some(ContactAction::Back),
        FormAction::Submit => {
            state.form.submitting = true;
            Some(ContactAction::Send(state.form.contact_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactState {
        let mut state = ContactState::new();
        state.form.set_value("Name", "Ravi");
        state.form.set_value("Email", "ravi@example.com");
        state.form.set_value("Message", "Hello");
        state
    }

    #[test]
    fn sending_clears_the_form() {
        let mut state = filled();
        let action = handle_input(&mut state, KeyCode::Char('s'));
        assert!(matches!(action, Some(ContactAction::Send(ref m)) if m.name == "Ravi"));

        state.finish(Ok(()));
        assert_eq!(state.form.value("Message"), "");
        assert!(state.notice.is_some());
    }

    #[test]
    fn failure_keeps_the_message() {
        let mut state = filled();
        handle_input(&mut state, KeyCode::Char('s'));
        state.finish(Err(ApiError::Unauthorized));

        assert_eq!(state.form.value("Message"), "Hello");
        assert!(state.form.error.is_some());
        assert!(!state.form.submitting);
    }
}
