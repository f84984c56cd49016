use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::nav::Sidebar;

/// Draw the role's menu plus the trailing logout entry
pub fn render_sidebar<B: Backend>(f: &mut Frame<B>, area: Rect, sidebar: &Sidebar, focused: bool) {
    let open = sidebar.is_open();

    let mut items: Vec<ListItem> = sidebar
        .items()
        .iter()
        .map(|item| {
            let marker = Span::styled("■ ", Style::default().fg(item.color));
            if open {
                ListItem::new(Spans::from(vec![marker, Span::raw(item.label)]))
            } else {
                ListItem::new(Spans::from(vec![marker]))
            }
        })
        .collect();
    let logout = if open { "⏻ Logout" } else { "⏻" };
    items.push(ListItem::new(Spans::from(Span::styled(
        logout,
        Style::default().fg(Color::Red),
    ))));

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = if open { sidebar.role().title() } else { "" };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(sidebar.selected()));
    f.render_stateful_widget(list, area, &mut state);
}
