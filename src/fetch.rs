//! Per-view fetch state.
//!
//! Every screen fetches its own data when it becomes active. Requests run on
//! tokio tasks and report back tagged with the [`ViewToken`] of the screen that
//! asked; once the user moves on, the [`ViewGuard`] generation changes and late
//! answers are dropped.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::StatKey;

/// Result of one independent request, as a screen sees it
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(err) => Loadable::Failed(err.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies the screen activation a response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewToken(u64);

/// Hands out a fresh token on every screen change
#[derive(Debug, Default)]
pub struct ViewGuard {
    generation: u64,
}

impl ViewGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new view; earlier tokens become stale
    pub fn activate(&mut self) -> ViewToken {
        self.generation += 1;
        ViewToken(self.generation)
    }

    pub fn current(&self) -> ViewToken {
        ViewToken(self.generation)
    }

    pub fn is_current(&self, token: ViewToken) -> bool {
        token.0 == self.generation
    }
}

/// Scalar statistics keyed by endpoint
#[derive(Debug, Clone, Default)]
pub struct StatBoard {
    cells: BTreeMap<StatKey, Loadable<Decimal>>,
    order: Vec<StatKey>,
}

impl StatBoard {
    /// All keys start out loading
    pub fn new(keys: &[StatKey]) -> Self {
        Self {
            cells: keys.iter().map(|k| (*k, Loadable::Loading)).collect(),
            order: keys.to_vec(),
        }
    }

    pub fn keys(&self) -> &[StatKey] {
        &self.order
    }

    /// Store one response. Keys not on this board are ignored.
    pub fn apply(&mut self, key: StatKey, result: Result<Decimal, String>) {
        if let Some(cell) = self.cells.get_mut(&key) {
            *cell = Loadable::from_result(result);
        } else {
            tracing::debug!(?key, "stat for a board that does not show it");
        }
    }

    pub fn get(&self, key: StatKey) -> Option<&Loadable<Decimal>> {
        self.cells.get(&key)
    }

    /// Cells in display order
    pub fn cells(&self) -> impl Iterator<Item = (StatKey, &Loadable<Decimal>)> {
        self.order
            .iter()
            .filter_map(|k| self.cells.get(k).map(|cell| (*k, cell)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_tokens_are_rejected() {
        let mut guard = ViewGuard::new();
        let first = guard.activate();
        assert!(guard.is_current(first));

        let second = guard.activate();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
        assert_eq!(guard.current(), second);
    }

    #[test]
    fn stats_land_on_their_own_key_in_any_order() {
        let keys = [
            StatKey::TotalSales,
            StatKey::CustomerCount,
            StatKey::ProductCount,
        ];
        let mut forward = StatBoard::new(&keys);
        let mut backward = StatBoard::new(&keys);

        let answers = [
            (StatKey::TotalSales, Ok(Decimal::new(125050, 2))),
            (StatKey::CustomerCount, Err("boom".to_string())),
            (StatKey::ProductCount, Ok(Decimal::from(7))),
        ];
        for (key, result) in answers.iter().cloned() {
            forward.apply(key, result);
        }
        for (key, result) in answers.iter().rev().cloned() {
            backward.apply(key, result);
        }

        for key in keys {
            assert_eq!(forward.get(key), backward.get(key));
        }
        assert_eq!(
            forward.get(StatKey::TotalSales),
            Some(&Loadable::Ready(Decimal::new(125050, 2)))
        );
        assert_eq!(
            forward.get(StatKey::CustomerCount).and_then(|c| c.error()),
            Some("boom")
        );
    }

    #[test]
    fn unanswered_and_foreign_keys() {
        let mut board = StatBoard::new(&[StatKey::PendingAmount]);
        board.apply(StatKey::InventoryValue, Ok(Decimal::ONE));

        assert!(board.get(StatKey::PendingAmount).is_some_and(Loadable::is_loading));
        assert!(board.get(StatKey::InventoryValue).is_none());
        assert_eq!(board.cells().count(), 1);
    }
}
