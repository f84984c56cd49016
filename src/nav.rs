use tui::style::Color;

use crate::routes::Route;
use crate::session::Role;

/// One sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub target: Route,
    pub color: Color,
    pub roles: &'static [Role],
}

impl MenuItem {
    pub fn visible_to(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

const STAFF: &[Role] = &[Role::Admin, Role::Accountant];
const ADMIN: &[Role] = &[Role::Admin];
const CUSTOMER: &[Role] = &[Role::Customer];
const EVERYONE: &[Role] = &[Role::Admin, Role::Accountant, Role::Customer];

pub const SIDEBAR_ITEMS: &[MenuItem] = &[
    MenuItem { label: "Overview", target: Route::Dashboard, color: Color::Rgb(0x63, 0x66, 0xf1), roles: STAFF },
    MenuItem { label: "Home", target: Route::Dashboard, color: Color::Rgb(0x8b, 0x5c, 0xf6), roles: CUSTOMER },
    MenuItem { label: "Products", target: Route::Products, color: Color::Rgb(0x8b, 0x5c, 0xf6), roles: ADMIN },
    MenuItem { label: "Users", target: Route::Users, color: Color::Rgb(0xec, 0x48, 0x99), roles: STAFF },
    MenuItem { label: "Sales", target: Route::Sales, color: Color::Rgb(0x10, 0xb9, 0x81), roles: STAFF },
    MenuItem { label: "Orders", target: Route::Orders, color: Color::Rgb(0xf5, 0x9e, 0x0b), roles: STAFF },
    MenuItem { label: "Invoices", target: Route::InvoiceCreation, color: Color::Rgb(0x6e, 0xe7, 0xb7), roles: STAFF },
    MenuItem { label: "Order History", target: Route::OrderHistory, color: Color::Yellow, roles: CUSTOMER },
    MenuItem { label: "Analytics", target: Route::Analytics, color: Color::Rgb(0x3b, 0x82, 0xf6), roles: ADMIN },
    MenuItem { label: "Settings", target: Route::Settings, color: Color::Rgb(0x6e, 0xe7, 0xb7), roles: EVERYONE },
];

/// The entries of `items` visible to `role`, in their original order
pub fn visible_items(items: &[MenuItem], role: Role) -> Vec<&MenuItem> {
    items.iter().filter(|item| item.visible_to(role)).collect()
}

/// What the sidebar asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Navigate(Route),
    Logout,
}

/// Sidebar state: which entry is highlighted and whether labels are shown
pub struct Sidebar {
    role: Role,
    open: bool,
    selected: usize,
}

impl Sidebar {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            open: true,
            selected: 0,
        }
    }

    pub fn items(&self) -> Vec<&'static MenuItem> {
        visible_items(SIDEBAR_ITEMS, self.role)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Collapse or expand; the visible entries stay the same
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Column width in terminal cells
    pub fn width(&self) -> u16 {
        if self.open { 22 } else { 5 }
    }

    /// Index into `items()`; one past the end is the logout entry
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn next(&mut self) {
        let count = self.items().len() + 1;
        self.selected = (self.selected + 1) % count;
    }

    pub fn previous(&mut self) {
        let count = self.items().len() + 1;
        self.selected = (self.selected + count - 1) % count;
    }

    /// Highlight the entry for `route` if there is one
    pub fn highlight(&mut self, route: Route) {
        if let Some(index) = self.items().iter().position(|item| item.target == route) {
            self.selected = index;
        }
    }

    pub fn activate(&self) -> NavAction {
        match self.items().get(self.selected) {
            Some(item) => NavAction::Navigate(item.target),
            None => NavAction::Logout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&MenuItem]) -> Vec<&'static str> {
        items.iter().map(|item| item.label).collect()
    }

    #[test]
    fn admin_menu() {
        assert_eq!(
            labels(&visible_items(SIDEBAR_ITEMS, Role::Admin)),
            ["Overview", "Products", "Users", "Sales", "Orders", "Invoices", "Analytics", "Settings"]
        );
    }

    #[test]
    fn accountant_menu() {
        assert_eq!(
            labels(&visible_items(SIDEBAR_ITEMS, Role::Accountant)),
            ["Overview", "Users", "Sales", "Orders", "Invoices", "Settings"]
        );
    }

    #[test]
    fn customer_menu() {
        assert_eq!(
            labels(&visible_items(SIDEBAR_ITEMS, Role::Customer)),
            ["Home", "Order History", "Settings"]
        );
    }

    #[test]
    fn filter_preserves_order_and_membership_for_any_definition() {
        let custom = [
            MenuItem { label: "c", target: Route::Sales, color: Color::Red, roles: CUSTOMER },
            MenuItem { label: "a", target: Route::Users, color: Color::Red, roles: EVERYONE },
            MenuItem { label: "b", target: Route::Orders, color: Color::Red, roles: ADMIN },
            MenuItem { label: "d", target: Route::Settings, color: Color::Red, roles: STAFF },
        ];

        for role in Role::ALL {
            let visible = visible_items(&custom, role);
            let expected: Vec<&MenuItem> = custom.iter().filter(|i| i.roles.contains(&role)).collect();
            assert_eq!(visible, expected);
        }
        assert_eq!(labels(&visible_items(&custom, Role::Admin)), ["a", "b", "d"]);
    }

    #[test]
    fn every_menu_target_is_openable_by_its_roles() {
        for item in SIDEBAR_ITEMS {
            for role in item.roles {
                assert!(role.can_open(item.target), "{} for {role}", item.label);
            }
        }
    }

    #[test]
    fn toggle_changes_width_not_items() {
        let mut sidebar = Sidebar::new(Role::Accountant);
        let before = labels(&sidebar.items());
        let wide = sidebar.width();

        sidebar.toggle();

        assert!(!sidebar.is_open());
        assert!(sidebar.width() < wide);
        assert_eq!(labels(&sidebar.items()), before);
    }

    #[test]
    fn selection_wraps_through_logout() {
        let mut sidebar = Sidebar::new(Role::Customer);
        assert_eq!(sidebar.activate(), NavAction::Navigate(Route::Dashboard));

        sidebar.previous();
        assert_eq!(sidebar.activate(), NavAction::Logout);

        sidebar.next();
        sidebar.next();
        assert_eq!(sidebar.activate(), NavAction::Navigate(Route::OrderHistory));

        sidebar.highlight(Route::Settings);
        assert_eq!(sidebar.activate(), NavAction::Navigate(Route::Settings));
    }
}
