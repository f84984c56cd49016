//! Client-side search and list patching for the table screens.

use crate::models::{Accountant, Customer, Invoice, Product};

/// Records with a stable server id
pub trait Identified {
    fn id(&self) -> i64;
}

/// Records the search box can match against
pub trait Searchable {
    /// The fields a search term is matched against
    fn search_fields(&self) -> Vec<String>;

    /// Case-insensitive substring match; an empty term matches everything
    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

impl Identified for Product {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.prod_name.clone(),
            self.product_category.clone(),
            self.prod_description.clone(),
        ]
    }
}

impl Identified for Customer {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Customer {
    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone()]
    }
}

impl Identified for Accountant {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Accountant {
    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone()]
    }
}

impl Identified for Invoice {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Invoice {
    fn search_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.customer.name.clone()]
    }
}

/// Records whose `term` search matches, in their original order
pub fn filter_text<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches(term)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Paid, StatusFilter::Unpaid];

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Paid => "Paid",
            StatusFilter::Unpaid => "Unpaid",
        }
    }

    pub fn next(&self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Paid,
            StatusFilter::Paid => StatusFilter::Unpaid,
            StatusFilter::Unpaid => StatusFilter::All,
        }
    }
}

/// Records that carry a payment status
pub trait HasStatus {
    fn is_paid(&self) -> bool;
}

impl HasStatus for Invoice {
    fn is_paid(&self) -> bool {
        Invoice::is_paid(self)
    }
}

impl StatusFilter {
    pub fn accepts<T: HasStatus>(&self, item: &T) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Paid => item.is_paid(),
            StatusFilter::Unpaid => !item.is_paid(),
        }
    }
}

/// A fetched list together with the search state of its screen
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    items: Vec<T>,
    search: String,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
        }
    }
}

impl<T: Identified + Searchable> ListView<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut view = Self::default();
        view.set_items(items);
        view
    }

    /// Replace the list with a fresh fetch, keeping the first of any repeated id
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items.clear();
        for item in items {
            if !self.contains(item.id()) {
                self.items.push(item);
            }
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
    }

    /// The rows the table shows
    pub fn visible(&self) -> Vec<&T> {
        filter_text(&self.items, &self.search)
    }

    /// Replace the record with the same id in place, or append it
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Drop the record with `id`; reports whether one was there
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        before != self.items.len()
    }
}

impl<T: Identified + Searchable + HasStatus> ListView<T> {
    /// Text search and status filter combined
    pub fn visible_with(&self, status: StatusFilter) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.matches(&self.search) && status.accepts(*item))
            .collect()
    }
}
