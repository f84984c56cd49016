use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::payment::{DebitRequest, PaymentFlow, PaymentState};
use crate::ui::components::popup::centered_rect;

pub fn render_payment_popup<B: Backend>(f: &mut Frame<B>, area: Rect, flow: &PaymentFlow) {
    let Some(invoice) = flow.invoice() else {
        return;
    };
    let popup = centered_rect(50, 40, area);

    let mut text = vec![
        Spans::from(Span::styled(
            format!("Pay invoice #{}", invoice.id),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from(format!("Amount: {}", super::money(invoice.total_amount))),
        Spans::from("The amount will be debited from your wallet."),
        Spans::from(""),
    ];

    match flow.state() {
        PaymentState::Idle { error } => {
            if let Some(error) = error {
                text.push(Spans::from(Span::styled(
                    error.clone(),
                    Style::default().fg(Color::Red),
                )));
                text.push(Spans::from(""));
            }
            text.push(Spans::from("<Enter> Confirm  <Esc> Cancel"));
        }
        PaymentState::Submitting => {
            text.push(Spans::from(Span::styled(
                "Processing payment...",
                Style::default().fg(Color::Gray),
            )));
        }
        PaymentState::Succeeded { .. } => {}
    }

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Payment")),
        popup,
    );
}

pub fn render_payment_success<B: Backend>(f: &mut Frame<B>, area: Rect, flow: &PaymentFlow) {
    let message = match flow.state() {
        PaymentState::Succeeded { message, .. } if !message.is_empty() => message.clone(),
        _ => "Payment successful".to_string(),
    };

    let text = vec![
        Spans::from(""),
        Spans::from(Span::styled(
            "✔ Payment Successful",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from(message),
        Spans::from(""),
        Spans::from("You will be taken back shortly."),
    ];
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Keys for the open payment popup
pub fn handle_input(flow: &mut PaymentFlow, key: KeyCode) -> Option<DebitRequest> {
    match key {
        KeyCode::Enter | KeyCode::Char('y') => flow.confirm(),
        KeyCode::Esc | KeyCode::Char('n') => {
            flow.cancel();
            None
        }
        _ => None,
    }
}
