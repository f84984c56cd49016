use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn render_message<B: Backend>(frame: &mut Frame<B>, area: Rect, title: &str, lines: Vec<Spans>, color: Color) {
    let popup_area = centered_rect(60, 25, area);
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .style(Style::default().fg(color).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn render_error<B: Backend>(frame: &mut Frame<B>, area: Rect, error: &str) {
    render_message(
        frame,
        area,
        "Error",
        vec![
            Spans::from(""),
            Spans::from(error.to_string()),
            Spans::from(""),
            Spans::from("Press any key to continue"),
        ],
        Color::Red,
    );
}

pub fn render_success<B: Backend>(frame: &mut Frame<B>, area: Rect, message: &str) {
    render_message(
        frame,
        area,
        "Success",
        vec![
            Spans::from(""),
            Spans::from(message.to_string()),
            Spans::from(""),
            Spans::from("Press any key to continue"),
        ],
        Color::Green,
    );
}

pub fn render_confirm<B: Backend>(frame: &mut Frame<B>, area: Rect, prompt: &str) {
    render_message(
        frame,
        area,
        "Confirm Delete",
        vec![
            Spans::from(""),
            Spans::from(prompt.to_string()),
            Spans::from(""),
            Spans::from("<Y> Yes  <N> No"),
        ],
        Color::White,
    );
}
