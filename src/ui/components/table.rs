use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::fetch::Loadable;
use crate::forms::{Entity, EntityForm, FormOutcome, Mutation, MutationKind, PendingDelete};
use crate::listing::{Identified, ListView, Searchable};
use crate::ui::components::form::{handle_form_key, render_form, FormAction};
use crate::ui::components::popup::{render_confirm, render_error, render_success};

/// What a key press on a [`CrudTable`] turned into
pub enum CrudEvent<T> {
    New,
    Edit(T),
    Submit,
    Delete(i64),
    Refresh,
}

/// A searchable table with create/edit form, delete confirmation and notices
pub struct CrudTable<T> {
    pub entity: Entity,
    pub list: Loadable<ListView<T>>,
    pub table_state: TableState,
    pub searching: bool,
    pub form: Option<EntityForm>,
    pub pending_delete: Option<PendingDelete>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl<T: Identified + Searchable + Clone> CrudTable<T> {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            list: Loadable::Loading,
            table_state: TableState::default(),
            searching: false,
            form: None,
            pending_delete: None,
            notice: None,
            error: None,
        }
    }

    /// Store a fetch result, keeping the current search term
    pub fn loaded(&mut self, result: Result<Vec<T>, String>) {
        let search = self
            .list
            .ready()
            .map(|view| view.search().to_string())
            .unwrap_or_default();
        self.list = match result {
            Ok(items) => {
                let mut view = ListView::new(items);
                view.set_search(&search);
                Loadable::Ready(view)
            }
            Err(message) => Loadable::Failed(message),
        };
        self.clamp_selection();
    }

    pub fn visible(&self) -> Vec<&T> {
        self.list.ready().map(ListView::visible).unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&T> {
        let visible = self.visible();
        self.table_state
            .selected()
            .and_then(|i| visible.get(i).copied())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        let selected = match self.table_state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    fn move_selection(&mut self, forward: bool) {
        let next = crate::ui::step(self.table_state.selected(), self.visible().len(), forward);
        self.table_state.select(next);
    }

    pub fn apply(&mut self, mutation: Mutation<T>) {
        match mutation {
            Mutation::Created { result, refreshed } => {
                match FormOutcome::from_result(self.entity, MutationKind::Create, &result) {
                    FormOutcome::Done(notice) => {
                        self.form = None;
                        self.notice = Some(notice);
                        if let Some(refreshed) = refreshed {
                            self.loaded(refreshed);
                        }
                    }
                    FormOutcome::Rejected(err) => self.reject(err.message),
                }
            }
            Mutation::Updated { record, result } => {
                match FormOutcome::from_result(self.entity, MutationKind::Update, &result) {
                    FormOutcome::Done(notice) => {
                        if let Some(view) = self.list.ready_mut() {
                            view.upsert(record);
                        }
                        self.form = None;
                        self.notice = Some(notice);
                    }
                    FormOutcome::Rejected(err) => self.reject(err.message),
                }
            }
            Mutation::Deleted { id, result } => {
                match FormOutcome::from_result(self.entity, MutationKind::Delete, &result) {
                    FormOutcome::Done(notice) => {
                        if let Some(view) = self.list.ready_mut() {
                            view.remove(id);
                        }
                        self.notice = Some(notice);
                        self.clamp_selection();
                    }
                    FormOutcome::Rejected(err) => self.error = Some(err.message),
                }
            }
        }
    }

    /// Failed create or update: the form stays open with its values
    fn reject(&mut self, message: String) {
        match &mut self.form {
            Some(form) => {
                form.submitting = false;
                form.error = Some(message);
            }
            None => self.error = Some(message),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, label: impl Fn(&T) -> String) -> Option<CrudEvent<T>> {
        if self.notice.take().is_some() || self.error.take().is_some() {
            return None;
        }

        if let Some(pending) = &self.pending_delete {
            return match PendingDelete::answer(key) {
                Some(true) => {
                    let id = pending.id;
                    self.pending_delete = None;
                    Some(CrudEvent::Delete(id))
                }
                Some(false) => {
                    self.pending_delete = None;
                    None
                }
                None => None,
            };
        }

        if let Some(form) = &mut self.form {
            return match handle_form_key(form, key)? {
                FormAction::Cancel => {
                    self.form = None;
                    None
                }
                FormAction::Submit => Some(CrudEvent::Submit),
            };
        }

        if self.searching {
            match key {
                KeyCode::Esc | KeyCode::Enter => self.searching = false,
                KeyCode::Char(c) => {
                    if let Some(view) = self.list.ready_mut() {
                        view.push_search(c);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(view) = self.list.ready_mut() {
                        view.pop_search();
                    }
                }
                _ => {}
            }
            self.clamp_selection();
            return None;
        }

        match key {
            KeyCode::Down => self.move_selection(true),
            KeyCode::Up => self.move_selection(false),
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('r') => return Some(CrudEvent::Refresh),
            KeyCode::Char('n') => return Some(CrudEvent::New),
            KeyCode::Char('e') => return self.selected().cloned().map(CrudEvent::Edit),
            KeyCode::Char('d') => {
                if let Some(item) = self.selected() {
                    self.pending_delete = Some(PendingDelete::new(self.entity, item.id(), label(item)));
                }
            }
            _ => {}
        }
        None
    }

    /// Table with search bar and any open overlay
    pub fn render<B: Backend>(
        &mut self,
        f: &mut Frame<B>,
        area: Rect,
        title: &str,
        headers: &[&str],
        widths: &[Constraint],
        cells: impl Fn(&T) -> Vec<String>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)].as_ref())
            .split(area);

        let search = self.list.ready().map(|v| v.search().to_string()).unwrap_or_default();
        let search_style = if self.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let cursor = if self.searching { "|" } else { "" };
        let search_bar = Paragraph::new(format!("{search}{cursor}"))
            .style(search_style)
            .block(Block::default().borders(Borders::ALL).title("Search (/)"));
        f.render_widget(search_bar, chunks[0]);

        let Some(view) = crate::ui::render_loadable(f, chunks[1], title, &self.list) else {
            return;
        };

        let rows: Vec<Row> = view
            .visible()
            .into_iter()
            .map(|item| Row::new(cells(item)))
            .collect();
        let header = Row::new(headers.iter().map(|h| h.to_string()).collect::<Vec<_>>())
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let table = Table::new(rows)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .widths(widths)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_stateful_widget(table, chunks[1], &mut self.table_state);

        if let Some(form) = &self.form {
            render_form(f, area, form);
        }
        if let Some(pending) = &self.pending_delete {
            render_confirm(f, area, &pending.prompt());
        }
        if let Some(notice) = &self.notice {
            render_success(f, area, notice);
        }
        if let Some(error) = &self.error {
            render_error(f, area, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::forms::CUSTOMER_EMAIL_TAKEN;
    use crate::models::{Customer, Product};
    use rust_decimal::Decimal;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            prod_name: name.into(),
            prod_description: String::new(),
            product_category: "Office".into(),
            price: Decimal::ONE,
        }
    }

    fn products() -> CrudTable<Product> {
        let mut table = CrudTable::new(Entity::Product);
        table.loaded(Ok(vec![product(3, "Pen"), product(7, "Stapler"), product(9, "Ink")]));
        table
    }

    fn ids(table: &CrudTable<Product>) -> Vec<i64> {
        table.visible().iter().map(|p| p.id).collect()
    }

    #[test]
    fn confirmed_delete_of_7_patches_the_list() {
        let mut table = products();
        table.handle_key(KeyCode::Down, |p| p.prod_name.clone());
        table.handle_key(KeyCode::Char('d'), |p| p.prod_name.clone());
        assert!(table.pending_delete.is_some());

        let event = table.handle_key(KeyCode::Char('y'), |p| p.prod_name.clone());
        assert!(matches!(event, Some(CrudEvent::Delete(7))));

        table.apply(Mutation::Deleted { id: 7, result: Ok(()) });
        assert_eq!(ids(&table), vec![3, 9]);
        assert!(table.notice.is_some());
    }

    #[test]
    fn failed_delete_leaves_the_list_alone() {
        let mut table = products();
        table.apply(Mutation::Deleted {
            id: 7,
            result: Err(ApiError::Status {
                status: 500,
                message: String::new(),
            }),
        });
        assert_eq!(ids(&table), vec![3, 7, 9]);
        assert!(table.error.is_some());
    }

    #[test]
    fn declining_the_prompt_sends_nothing() {
        let mut table = products();
        table.handle_key(KeyCode::Char('d'), |p| p.prod_name.clone());
        assert!(table.handle_key(KeyCode::Char('n'), |p| p.prod_name.clone()).is_none());
        assert!(table.pending_delete.is_none());
        assert_eq!(ids(&table), vec![3, 7, 9]);
    }

    #[test]
    fn update_replaces_by_id() {
        let mut table = products();
        table.apply(Mutation::Updated {
            record: product(7, "Stapler XL"),
            result: Ok(()),
        });
        assert_eq!(ids(&table), vec![3, 7, 9]);
        assert_eq!(table.list.ready().and_then(|v| v.get(7)).map(|p| p.prod_name.as_str()), Some("Stapler XL"));
    }

    #[test]
    fn conflict_keeps_the_customer_form_open() {
        let mut table: CrudTable<Customer> = CrudTable::new(Entity::Customer);
        table.loaded(Ok(Vec::new()));
        table.handle_key(KeyCode::Char('n'), |c| c.name.clone());
        let mut form = EntityForm::new_customer();
        form.set_value("Email", "taken@example.com");
        form.submitting = true;
        table.form = Some(form);

        table.apply(Mutation::Created {
            result: Err(ApiError::Conflict("exists".into())),
            refreshed: None,
        });

        let form = table.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some(CUSTOMER_EMAIL_TAKEN));
        assert_eq!(form.value("Email"), "taken@example.com");
        assert!(!form.submitting);
    }

    #[test]
    fn search_narrows_the_rows_and_survives_refetch() {
        let mut table = products();
        table.handle_key(KeyCode::Char('/'), |p| p.prod_name.clone());
        for c in "st".chars() {
            table.handle_key(KeyCode::Char(c), |p| p.prod_name.clone());
        }
        table.handle_key(KeyCode::Enter, |p| p.prod_name.clone());
        assert_eq!(ids(&table), vec![7]);

        table.loaded(Ok(vec![product(7, "Stapler"), product(11, "Stamp")]));
        assert_eq!(ids(&table), vec![7, 11]);
    }
}
