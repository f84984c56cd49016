use crate::session::{Role, Session};

/// Every page the console can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Welcome,
    About,
    Contact,
    Login(Role),
    Dashboard,
    Products,
    Users,
    Sales,
    Orders,
    Analytics,
    Settings,
    InvoiceCreation,
    OrderHistory,
    PaymentSuccess,
}

impl Route {
    pub const PROTECTED: [Route; 10] = [
        Route::Dashboard,
        Route::Products,
        Route::Users,
        Route::Sales,
        Route::Orders,
        Route::Analytics,
        Route::Settings,
        Route::InvoiceCreation,
        Route::OrderHistory,
        Route::PaymentSuccess,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Welcome => "/",
            Route::About => "/about",
            Route::Contact => "/contact",
            Route::Login(Role::Admin) => "/admin-login",
            Route::Login(Role::Accountant) => "/accountant-login",
            Route::Login(Role::Customer) => "/customer-login",
            Route::Dashboard => "/dashboard",
            Route::Products => "/products",
            Route::Users => "/users",
            Route::Sales => "/sales",
            Route::Orders => "/orders",
            Route::Analytics => "/analytics",
            Route::Settings => "/settings",
            Route::InvoiceCreation => "/invoice",
            Route::OrderHistory => "/order-history",
            Route::PaymentSuccess => "/payment-success",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let route = match path {
            "/" => Route::Welcome,
            "/about" => Route::About,
            "/contact" => Route::Contact,
            "/admin-login" => Route::Login(Role::Admin),
            "/accountant-login" => Route::Login(Role::Accountant),
            "/customer-login" => Route::Login(Role::Customer),
            "/dashboard" => Route::Dashboard,
            "/products" => Route::Products,
            "/users" => Route::Users,
            "/sales" => Route::Sales,
            "/orders" => Route::Orders,
            "/analytics" => Route::Analytics,
            "/settings" => Route::Settings,
            "/invoice" => Route::InvoiceCreation,
            "/order-history" => Route::OrderHistory,
            "/payment-success" => Route::PaymentSuccess,
            _ => return None,
        };
        Some(route)
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Welcome | Route::About | Route::Contact | Route::Login(_)
        )
    }
}

impl Role {
    /// Protected routes this role may open
    pub fn allowed_routes(&self) -> &'static [Route] {
        match self {
            Role::Admin => &[
                Route::Dashboard,
                Route::Products,
                Route::Users,
                Route::Sales,
                Route::Orders,
                Route::Analytics,
                Route::Settings,
                Route::InvoiceCreation,
            ],
            Role::Accountant => &[
                Route::Dashboard,
                Route::Users,
                Route::Sales,
                Route::Orders,
                Route::Settings,
                Route::InvoiceCreation,
            ],
            Role::Customer => &[
                Route::Dashboard,
                Route::OrderHistory,
                Route::Settings,
                Route::PaymentSuccess,
            ],
        }
    }

    pub fn can_open(&self, route: Route) -> bool {
        self.allowed_routes().contains(&route)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Granted(Route),
    RedirectToLogin,
}

/// Decide what a navigation to `route` shows under `session`
pub fn resolve(session: &Session, route: Route) -> Resolution {
    if route.is_public() {
        return Resolution::Granted(route);
    }

    match session.active_role() {
        Some(role) if role.can_open(route) => Resolution::Granted(route),
        _ => Resolution::RedirectToLogin,
    }
}

/// What a protected route renders for a given role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    CustomerOrders,
    OrderHistory,
    Products,
    Users,
    Sales,
    Orders,
    Analytics,
    Settings(Role),
    InvoiceCreation,
    PaymentSuccess,
}

/// Map a granted protected route to its page; `None` when `role` may not open it
pub fn page_for(role: Role, route: Route) -> Option<Page> {
    if !role.can_open(route) {
        return None;
    }

    let page = match (route, role) {
        (Route::Dashboard, Role::Customer) => Page::CustomerOrders,
        (Route::Dashboard, _) => Page::Overview,
        (Route::OrderHistory, _) => Page::OrderHistory,
        (Route::Products, _) => Page::Products,
        (Route::Users, _) => Page::Users,
        (Route::Sales, _) => Page::Sales,
        (Route::Orders, _) => Page::Orders,
        (Route::Analytics, _) => Page::Analytics,
        (Route::Settings, role) => Page::Settings(role),
        (Route::InvoiceCreation, _) => Page::InvoiceCreation,
        (Route::PaymentSuccess, _) => Page::PaymentSuccess,
        (Route::Welcome | Route::About | Route::Contact | Route::Login(_), _) => return None,
    };
    Some(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in(role: Role) -> Session {
        Session {
            logged_in: true,
            role: Some(role),
            user_id: Some("1".into()),
        }
    }

    fn expected_allowed(role: Role, route: Route) -> bool {
        use Route::*;
        match role {
            Role::Admin => matches!(
                route,
                Dashboard | Products | Users | Sales | Orders | Analytics | Settings | InvoiceCreation
            ),
            Role::Accountant => matches!(
                route,
                Dashboard | Users | Sales | Orders | Settings | InvoiceCreation
            ),
            Role::Customer => matches!(route, Dashboard | OrderHistory | Settings | PaymentSuccess),
        }
    }

    #[test]
    fn access_granted_iff_route_in_role_set() {
        for role in Role::ALL {
            let session = logged_in(role);
            for route in Route::PROTECTED {
                let granted = resolve(&session, route) == Resolution::Granted(route);
                assert_eq!(
                    granted,
                    expected_allowed(role, route),
                    "{role} -> {}",
                    route.path()
                );
            }
        }
    }

    #[test]
    fn logged_out_session_redirects_every_protected_route() {
        let mut session = logged_in(Role::Admin);
        session.logged_in = false;

        for route in Route::PROTECTED {
            assert_eq!(resolve(&session, route), Resolution::RedirectToLogin);
        }
    }

    #[test]
    fn unknown_role_redirects_every_protected_route() {
        let session = Session {
            logged_in: true,
            role: None,
            user_id: Some("3".into()),
        };

        for route in Route::PROTECTED {
            assert_eq!(resolve(&session, route), Resolution::RedirectToLogin);
        }
    }

    #[test]
    fn public_routes_always_open() {
        let session = Session::default();
        for route in [
            Route::Welcome,
            Route::About,
            Route::Contact,
            Route::Login(Role::Customer),
        ] {
            assert_eq!(resolve(&session, route), Resolution::Granted(route));
        }
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::PROTECTED {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        for role in Role::ALL {
            let login = Route::Login(role);
            assert_eq!(Route::from_path(login.path()), Some(login));
        }
        assert_eq!(Route::from_path("/nowhere"), None);
    }

    #[test]
    fn dashboard_page_depends_on_role() {
        assert_eq!(page_for(Role::Admin, Route::Dashboard), Some(Page::Overview));
        assert_eq!(page_for(Role::Accountant, Route::Dashboard), Some(Page::Overview));
        assert_eq!(page_for(Role::Customer, Route::Dashboard), Some(Page::CustomerOrders));
        assert_eq!(page_for(Role::Customer, Route::Products), None);
        assert_eq!(
            page_for(Role::Accountant, Route::Settings),
            Some(Page::Settings(Role::Accountant))
        );
    }
}
