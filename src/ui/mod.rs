pub mod components;
pub mod contact;
pub mod customer_orders;
pub mod invoice_wizard;
pub mod login;
pub mod orders;
pub mod payment;
pub mod products;
pub mod settings;
pub mod sidebar;
pub mod stats;
pub mod users;
pub mod welcome;

use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::fetch::Loadable;
use crate::invoice_gen::format_money;

pub use components::popup::centered_rect;

/// Placeholder for a view that has nothing to draw yet.
/// Returns the value when it is ready.
pub fn render_loadable<'a, B: Backend, T>(
    f: &mut Frame<B>,
    area: Rect,
    title: &str,
    value: &'a Loadable<T>,
) -> Option<&'a T> {
    let (text, color) = match value {
        Loadable::Ready(value) => return Some(value),
        Loadable::Loading => ("Loading...".to_string(), Color::Gray),
        Loadable::Failed(message) => (format!("Could not load: {message}"), Color::Red),
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(paragraph, area);
    None
}

/// One-line help or status bar at the bottom of a screen
pub fn render_help<B: Backend>(f: &mut Frame<B>, area: Rect, text: &str) {
    let help = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

pub fn money(amount: Decimal) -> String {
    format_money(amount)
}

pub fn date(value: Option<chrono::NaiveDate>) -> String {
    value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Move a table/list selection by one, wrapping at both ends
pub fn step(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match selected {
        Some(i) if forward => {
            if i + 1 >= len {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    Some(next)
}
