use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::routes::Route;
use crate::session::Role;

pub enum WelcomeAction {
    Open(Route),
    Quit,
}

const ENTRIES: [(&str, Route); 5] = [
    ("Admin Login", Route::Login(Role::Admin)),
    ("Accountant Login", Route::Login(Role::Accountant)),
    ("Customer Login", Route::Login(Role::Customer)),
    ("About", Route::About),
    ("Contact Us", Route::Contact),
];

pub struct WelcomeState {
    list_state: ListState,
    about: bool,
}

impl WelcomeState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            list_state,
            about: false,
        }
    }

    pub fn about() -> Self {
        Self {
            about: true,
            ..Self::new()
        }
    }

    pub fn is_about(&self) -> bool {
        self.about
    }

    fn selected(&self) -> Option<Route> {
        self.list_state
            .selected()
            .and_then(|i| ENTRIES.get(i))
            .map(|(_, route)| *route)
    }
}

impl Default for WelcomeState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_welcome<B: Backend>(f: &mut Frame<B>, state: &mut WelcomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let banner = Paragraph::new(vec![
        Spans::from(Span::styled(
            "Billing Console",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Spans::from("Invoices, customers and payments in one place"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(banner, chunks[0]);

    if state.about {
        render_about(f, chunks[1]);
        super::render_help(f, chunks[2], "Esc - Back | Q - Quit");
        return;
    }

    let items: Vec<ListItem> = ENTRIES
        .iter()
        .map(|(label, _)| ListItem::new(Spans::from(*label)))
        .collect();
    let menu = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Welcome"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(menu, chunks[1], &mut state.list_state);

    super::render_help(f, chunks[2], "Up/Down - Navigate | Enter - Open | Q - Quit");
}

fn render_about<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let text = vec![
        Spans::from(Span::styled("About", Style::default().add_modifier(Modifier::BOLD))),
        Spans::from(""),
        Spans::from("Administrators manage products, staff and customers and follow sales."),
        Spans::from("Accountants raise invoices, track orders and look after customers."),
        Spans::from("Customers review their invoices and pay them from their wallet."),
    ];
    let about = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(about, area);
}

pub fn handle_input(state: &mut WelcomeState, key: KeyCode) -> Option<WelcomeAction> {
    match key {
        KeyCode::Char('q') => return Some(WelcomeAction::Quit),
        KeyCode::Esc if state.about => return Some(WelcomeAction::Open(Route::Welcome)),
        _ if state.about => {}
        KeyCode::Down => {
            let next = super::step(state.list_state.selected(), ENTRIES.len(), true);
            state.list_state.select(next);
        }
        KeyCode::Up => {
            let next = super::step(state.list_state.selected(), ENTRIES.len(), false);
            state.list_state.select(next);
        }
        KeyCode::Enter => return state.selected().map(WelcomeAction::Open),
        _ => {}
    }
    None
}
