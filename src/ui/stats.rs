use crossterm::event::KeyCode;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

use crate::fetch::{Loadable, StatBoard};
use crate::models::{DailySales, StatKey};

/// The three statistics pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPage {
    Overview,
    Sales,
    Analytics,
}

impl StatsPage {
    pub fn title(&self) -> &'static str {
        match self {
            StatsPage::Overview => "Overview",
            StatsPage::Sales => "Sales",
            StatsPage::Analytics => "Analytics",
        }
    }

    /// Only the overview carries the daily sales chart
    pub fn has_daily_sales(&self) -> bool {
        matches!(self, StatsPage::Overview)
    }

    pub fn keys(&self) -> &'static [StatKey] {
        match self {
            StatsPage::Overview => &[
                StatKey::TotalSales,
                StatKey::CustomerCount,
                StatKey::ProductCount,
                StatKey::AccountantCount,
                StatKey::InvoiceCount,
                StatKey::PendingAmount,
            ],
            StatsPage::Sales => &[
                StatKey::TodaysOrders,
                StatKey::TodaysSales,
                StatKey::TodaysCustomers,
                StatKey::WeeklySales,
                StatKey::WeeklyCustomers,
                StatKey::AverageOrderValue,
                StatKey::CompletedOrders,
            ],
            StatsPage::Analytics => &[
                StatKey::TotalSales,
                StatKey::InventoryValue,
                StatKey::AveragePricePerProduct,
                StatKey::PendingAmount,
                StatKey::InvoiceCount,
                StatKey::CompletedOrders,
            ],
        }
    }
}

pub enum StatsAction {
    Refresh,
}

pub struct StatsState {
    pub page: StatsPage,
    pub board: StatBoard,
    pub daily_sales: Option<Loadable<Vec<DailySales>>>,
}

impl StatsState {
    pub fn new(page: StatsPage) -> Self {
        Self {
            page,
            board: StatBoard::new(page.keys()),
            daily_sales: page.has_daily_sales().then_some(Loadable::Loading),
        }
    }

    pub fn daily_sales_loaded(&mut self, result: Result<Vec<DailySales>, String>) {
        if let Some(slot) = &mut self.daily_sales {
            *slot = Loadable::from_result(result);
        }
    }
}

/// Bar labels and heights; sales are rounded to whole units and negatives drop to zero
pub fn sales_bars(days: &[DailySales]) -> Vec<(String, u64)> {
    days.iter()
        .map(|day| {
            let label = day.date.get(5..10).unwrap_or(&day.date).to_string();
            let height = day.sales.round().to_u64().unwrap_or(0);
            (label, height)
        })
        .collect()
}

pub fn format_stat(key: StatKey, value: Decimal) -> String {
    if key.is_money() {
        super::money(value)
    } else {
        value.normalize().to_string()
    }
}

const PER_ROW: usize = 3;

pub fn render_stats<B: Backend>(f: &mut Frame<B>, area: Rect, state: &StatsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    let cells: Vec<(StatKey, &Loadable<Decimal>)> = state.board.cells().collect();
    let rows = cells.len().div_ceil(PER_ROW).max(1);
    let (cards_area, chart_area) = match &state.daily_sales {
        Some(_) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(5 * rows as u16), Constraint::Min(8)].as_ref())
                .split(chunks[0]);
            (split[0], Some(split[1]))
        }
        None => (chunks[0], None),
    };
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(5); rows])
        .split(cards_area);

    for (row, chunk) in cells.chunks(PER_ROW).enumerate() {
        let Some(row_area) = row_areas.get(row) else {
            break;
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, PER_ROW as u32); PER_ROW])
            .split(*row_area);

        for ((key, cell), column) in chunk.iter().zip(columns.iter()) {
            let (text, color) = match cell {
                Loadable::Loading => ("...".to_string(), Color::Gray),
                Loadable::Ready(value) => (format_stat(*key, *value), Color::Green),
                Loadable::Failed(_) => ("unavailable".to_string(), Color::Red),
            };
            let card = Paragraph::new(vec![
                Spans::from(""),
                Spans::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(key.label()));
            f.render_widget(card, *column);
        }
    }

    if let (Some(area), Some(daily_sales)) = (chart_area, &state.daily_sales) {
        render_daily_sales(f, area, daily_sales);
    }

    super::render_help(
        f,
        chunks[1],
        &format!("{} | R - Refresh | Tab - Menu", state.page.title()),
    );
}

fn render_daily_sales<B: Backend>(f: &mut Frame<B>, area: Rect, daily_sales: &Loadable<Vec<DailySales>>) {
    const TITLE: &str = "Daily Sales Trend";
    let Some(days) = super::render_loadable(f, area, TITLE, daily_sales) else {
        return;
    };
    if days.is_empty() {
        let empty = Paragraph::new("No sales recorded yet")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(TITLE));
        f.render_widget(empty, area);
        return;
    }

    let bars = sales_bars(days);
    let data: Vec<(&str, u64)> = bars.iter().map(|(label, value)| (label.as_str(), *value)).collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(TITLE))
        .data(&data)
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));
    f.render_widget(chart, area);
}

pub fn handle_input(_state: &mut StatsState, key: KeyCode) -> Option<StatsAction> {
    match key {
        KeyCode::Char('r') => Some(StatsAction::Refresh),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_amounts_format_differently() {
        assert_eq!(format_stat(StatKey::CustomerCount, Decimal::new(120, 1)), "12");
        assert_eq!(format_stat(StatKey::TotalSales, Decimal::new(12, 0)), "Rs 12.00");
    }

    #[test]
    fn every_page_starts_loading() {
        for page in [StatsPage::Overview, StatsPage::Sales, StatsPage::Analytics] {
            let state = StatsState::new(page);
            assert_eq!(state.board.keys(), page.keys());
            assert!(state.board.cells().all(|(_, cell)| cell.is_loading()));
        }
    }

    fn day(date: &str, sales: &str) -> DailySales {
        DailySales {
            date: date.into(),
            sales: sales.parse().unwrap(),
        }
    }

    #[test]
    fn only_the_overview_tracks_daily_sales() {
        assert!(StatsState::new(StatsPage::Overview)
            .daily_sales
            .is_some_and(|d| d.is_loading()));
        assert!(StatsState::new(StatsPage::Sales).daily_sales.is_none());

        let mut sales = StatsState::new(StatsPage::Sales);
        sales.daily_sales_loaded(Ok(vec![day("2024-03-01", "10")]));
        assert!(sales.daily_sales.is_none());
    }

    #[test]
    fn daily_sales_failure_leaves_the_cards_alone() {
        let mut state = StatsState::new(StatsPage::Overview);
        state.board.apply(StatKey::TotalSales, Ok(Decimal::from(5)));
        state.daily_sales_loaded(Err("boom".into()));

        assert!(matches!(state.daily_sales, Some(Loadable::Failed(_))));
        assert!(state
            .board
            .cells()
            .any(|(key, cell)| key == StatKey::TotalSales && cell.ready().is_some()));
    }

    #[test]
    fn bars_use_month_and_day_and_whole_amounts() {
        let bars = sales_bars(&[
            day("2024-03-01", "1250.6"),
            day("2024-03-02", "-4"),
            day("Mon", "7"),
        ]);
        assert_eq!(
            bars,
            vec![
                ("03-01".to_string(), 1251),
                ("03-02".to_string(), 0),
                ("Mon".to_string(), 7),
            ]
        );
    }
}
