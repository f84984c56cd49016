use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::forms::EntityForm;

pub enum FormAction {
    Cancel,
    Submit,
}

/// Wizard-style key handling shared by every entity form
pub fn handle_form_key(form: &mut EntityForm, key: KeyCode) -> Option<FormAction> {
    match key {
        KeyCode::Esc => {
            if form.editing {
                form.toggle_editing();
            } else {
                return Some(FormAction::Cancel);
            }
        }
        KeyCode::Enter => form.toggle_editing(),
        KeyCode::Up if !form.editing => form.previous_field(),
        KeyCode::Down if !form.editing => form.next_field(),
        KeyCode::Char('s') if !form.editing => {
            if !form.submitting && form.validate() {
                return Some(FormAction::Submit);
            }
        }
        _ if form.editing => form.edit_current_field(key),
        _ => {}
    }
    None
}

/// Draw `form` as a popup over `area`
pub fn render_form<B: Backend>(f: &mut Frame<B>, area: Rect, form: &EntityForm) {
    let popup = super::popup::centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(form.fields.len() as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(popup);

    let items: Vec<ListItem> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == form.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let marker = if field.required { "*" } else { "" };
            let mut value = field.display();
            if selected && form.editing {
                value.push('|');
            }
            let value_style = if selected && form.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}{}: ", field.label, marker), label_style),
                Span::styled(value, value_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(form.title()),
    );
    f.render_widget(list, chunks[0]);

    let (status, color) = match (&form.error, form.submitting) {
        (_, true) => ("Saving...".to_string(), Color::Gray),
        (Some(error), false) => (error.clone(), Color::Red),
        (None, false) => (String::new(), Color::Gray),
    };
    let status = Paragraph::new(status)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[1]);

    let help_text = if form.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
