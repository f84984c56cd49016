use crossterm::event::KeyCode;
use tui::{backend::Backend, layout::{Constraint, Direction, Layout, Rect}, Frame};

use crate::forms::{Entity, EntityForm, Mutation};
use crate::models::{Product, ProductDraft};
use crate::ui::components::table::{CrudEvent, CrudTable};

pub enum ProductAction {
    Refresh,
    Create(ProductDraft),
    Update(Product),
    Delete(i64),
}

pub struct ProductsState {
    pub table: CrudTable<Product>,
}

impl ProductsState {
    pub fn new() -> Self {
        Self {
            table: CrudTable::new(Entity::Product),
        }
    }

    pub fn loaded(&mut self, result: Result<Vec<Product>, String>) {
        self.table.loaded(result);
    }

    pub fn apply(&mut self, mutation: Mutation<Product>) {
        self.table.apply(mutation);
    }
}

impl Default for ProductsState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_products<B: Backend>(f: &mut Frame<B>, area: Rect, state: &mut ProductsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    state.table.render(
        f,
        chunks[0],
        "Products",
        &["ID", "Name", "Category", "Description", "Price"],
        &[
            Constraint::Length(6),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(35),
            Constraint::Length(14),
        ],
        |p| {
            vec![
                p.id.to_string(),
                p.prod_name.clone(),
                p.product_category.clone(),
                p.prod_description.clone(),
                super::money(p.price),
            ]
        },
    );

    super::render_help(
        f,
        chunks[1],
        "<N> New | <E> Edit | <D> Delete | </> Search | <R> Refresh | <Tab> Menu",
    );
}

pub fn handle_input(state: &mut ProductsState, key: KeyCode) -> Option<ProductAction> {
    match state.table.handle_key(key, |p| p.prod_name.clone())? {
        CrudEvent::Refresh => Some(ProductAction::Refresh),
        CrudEvent::New => {
            state.table.form = Some(EntityForm::new_product());
            None
        }
        CrudEvent::Edit(product) => {
            state.table.form = Some(EntityForm::edit_product(&product));
            None
        }
        CrudEvent::Delete(id) => Some(ProductAction::Delete(id)),
        CrudEvent::Submit => {
            let form = state.table.form.as_mut()?;
            let action = match form.edit_id() {
                None => form.product_draft().map(ProductAction::Create),
                Some(id) => {
                    let original = state.table.list.ready().and_then(|v| v.get(id)).cloned()?;
                    form.updated_product(&original).map(ProductAction::Update)
                }
            };
            match action {
                Ok(action) => {
                    form.submitting = true;
                    Some(action)
                }
                Err(message) => {
                    form.error = Some(message);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn new_product_form_submits_a_draft() {
        let mut state = ProductsState::new();
        state.loaded(Ok(Vec::new()));
        handle_input(&mut state, KeyCode::Char('n'));
        let form = state.table.form.as_mut().unwrap();
        form.set_value("Name", "Pen");
        form.set_value("Category", "Office");
        form.set_value("Price", "2.5");

        match handle_input(&mut state, KeyCode::Char('s')) {
            Some(ProductAction::Create(draft)) => {
                assert_eq!(draft.prod_name, "Pen");
                assert_eq!(draft.price, Decimal::new(25, 1));
            }
            _ => panic!("expected a create"),
        }
        assert!(state.table.form.as_ref().is_some_and(|f| f.submitting));
    }

    #[test]
    fn bad_price_stays_on_the_form() {
        let mut state = ProductsState::new();
        state.loaded(Ok(Vec::new()));
        handle_input(&mut state, KeyCode::Char('n'));
        let form = state.table.form.as_mut().unwrap();
        form.set_value("Name", "Pen");
        form.set_value("Category", "Office");
        form.set_value("Price", "two");

        assert!(handle_input(&mut state, KeyCode::Char('s')).is_none());
        assert!(state.table.form.as_ref().and_then(|f| f.error.as_ref()).is_some());
    }
}
