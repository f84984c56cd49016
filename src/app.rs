//! Screen routing, background requests and the main loop.
//!
//! Every request runs on its own tokio task and reports back through one
//! channel. Results are tagged with the [`ViewToken`] of the page that asked
//! for them; anything that arrives after the user moved on is dropped.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rust_decimal::Decimal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::api::{ApiError, ApiResult, BillingClient};
use crate::config::Config;
use crate::fetch::{ViewGuard, ViewToken};
use crate::forms::Mutation;
use crate::invoice_gen::{InvoiceGenerator, MarkdownRenderer, PdfRenderer};
use crate::models::{
    Accountant, Customer, DailySales, Invoice, InvoiceAck, LoginResponse, Product, StatKey,
    WalletReceipt, WalletTopUp,
};
use crate::nav::{NavAction, Sidebar};
use crate::payment::{PaymentEffect, PaymentFlow};
use crate::routes::{page_for, resolve, Page, Resolution, Route};
use crate::session::{Role, Session, SessionContext};
use crate::ui::{
    contact::{handle_input as handle_contact_input, render_contact, ContactAction, ContactState},
    customer_orders::{
        handle_input as handle_customer_orders_input, render_customer_orders, CustomerOrderAction,
        CustomerOrdersState, CustomerView,
    },
    invoice_wizard::{
        handle_input as handle_invoice_wizard_input, render_invoice_wizard, InvoiceWizardAction,
        InvoiceWizardState,
    },
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
    orders::{handle_input as handle_orders_input, render_orders, OrderAction, OrdersState},
    payment::{handle_input as handle_payment_input, render_payment_popup, render_payment_success},
    products::{handle_input as handle_products_input, render_products, ProductAction, ProductsState},
    settings::{
        handle_input as handle_settings_input, render_settings, Profile, SettingsAction,
        SettingsState,
    },
    sidebar::render_sidebar,
    stats::{handle_input as handle_stats_input, render_stats, StatsAction, StatsPage, StatsState},
    users::{
        apply_accountants, apply_customers, handle_input as handle_users_input, render_users,
        UserAction, UsersState,
    },
    welcome::{handle_input as handle_welcome_input, render_welcome, WelcomeAction, WelcomeState},
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a background request
pub enum Payload {
    Stat(StatKey, Result<Decimal, String>),
    DailySales(Result<Vec<DailySales>, String>),
    Products(Result<Vec<Product>, String>),
    ProductChanged(Mutation<Product>),
    Customers(Result<Vec<Customer>, String>),
    CustomerChanged(Mutation<Customer>),
    Accountants(Result<Vec<Accountant>, String>),
    AccountantChanged(Mutation<Accountant>),
    Invoices(Result<Vec<Invoice>, String>),
    InvoiceDeleted(i64, ApiResult<()>),
    Profile(Result<Profile, String>),
    ProfileSaved(ApiResult<()>),
    WalletToppedUp(ApiResult<WalletTopUp>),
    WizardCustomers(Result<Vec<Customer>, String>),
    WizardProducts(Result<Vec<Product>, String>),
    InvoiceCreated(ApiResult<InvoiceAck>),
    Payment(ApiResult<WalletReceipt>),
    LoggedIn(Role, ApiResult<LoginResponse>),
    ContactSent(ApiResult<()>),
}

pub struct AppEvent {
    pub token: ViewToken,
    pub payload: Payload,
}

// Represents the current screen in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppScreen {
    Welcome,
    Contact,
    Login,
    Page(Page),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Content,
}

pub struct App {
    config: Config,
    client: BillingClient,
    session: SessionContext,
    guard: ViewGuard,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    screen: AppScreen,
    route: Route,
    focus: Focus,
    sidebar: Option<Sidebar>,
    payment: PaymentFlow,
    payment_origin: Route,
    welcome_state: Option<WelcomeState>,
    contact_state: Option<ContactState>,
    login_state: Option<LoginState>,
    stats_state: Option<StatsState>,
    products_state: Option<ProductsState>,
    users_state: Option<UsersState>,
    orders_state: Option<OrdersState>,
    customer_orders_state: Option<CustomerOrdersState>,
    settings_state: Option<SettingsState>,
    invoice_wizard_state: Option<InvoiceWizardState>,
}

fn text_err<T>(result: ApiResult<T>) -> Result<T, String> {
    result.map_err(|err| err.to_string())
}

impl App {
    pub fn new(config: Config, client: BillingClient, session: SessionContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let payment = PaymentFlow::new(config.payment_return_delay());
        Self {
            config,
            client,
            session,
            guard: ViewGuard::new(),
            tx,
            rx,
            screen: AppScreen::Welcome,
            route: Route::Welcome,
            focus: Focus::Content,
            sidebar: None,
            payment,
            payment_origin: Route::Dashboard,
            welcome_state: None,
            contact_state: None,
            login_state: None,
            stats_state: None,
            products_state: None,
            users_state: None,
            orders_state: None,
            customer_orders_state: None,
            settings_state: None,
            invoice_wizard_state: None,
        }
    }

    /// Open the first page: the dashboard for a remembered session, otherwise the welcome page
    pub fn start(&mut self) -> Result<()> {
        let session = self.session.current()?;
        let route = if session.active_role().is_some() {
            Route::Dashboard
        } else {
            Route::Welcome
        };
        self.navigate(route)
    }

    fn spawn<F>(&self, token: ViewToken, request: F)
    where
        F: Future<Output = Payload> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let payload = request.await;
            // Closed channel means the app is shutting down
            let _ = tx.send(AppEvent { token, payload });
        });
    }

    fn clear_screens(&mut self) {
        self.welcome_state = None;
        self.contact_state = None;
        self.login_state = None;
        self.stats_state = None;
        self.products_state = None;
        self.users_state = None;
        self.orders_state = None;
        self.customer_orders_state = None;
        self.settings_state = None;
        self.invoice_wizard_state = None;
    }

    pub fn navigate(&mut self, route: Route) -> Result<()> {
        let session = self.session.current()?;
        let route = match resolve(&session, route) {
            Resolution::Granted(route) => route,
            Resolution::RedirectToLogin => {
                tracing::info!(path = route.path(), "not signed in for this page");
                Route::Welcome
            }
        };

        let token = self.guard.activate();
        self.clear_screens();
        self.route = route;
        self.focus = Focus::Content;
        tracing::debug!(path = route.path(), "navigate");

        match route {
            Route::Welcome => {
                self.welcome_state = Some(WelcomeState::new());
                self.screen = AppScreen::Welcome;
            }
            Route::About => {
                self.welcome_state = Some(WelcomeState::about());
                self.screen = AppScreen::Welcome;
            }
            Route::Contact => {
                self.contact_state = Some(ContactState::new());
                self.screen = AppScreen::Contact;
            }
            Route::Login(role) => {
                self.login_state = Some(LoginState::new(role));
                self.screen = AppScreen::Login;
            }
            _ => {
                let Some((role, page)) = session
                    .active_role()
                    .and_then(|role| page_for(role, route).map(|page| (role, page)))
                else {
                    return self.navigate(Route::Welcome);
                };
                if self.sidebar.as_ref().map(Sidebar::role) != Some(role) {
                    self.sidebar = Some(Sidebar::new(role));
                }
                if let Some(sidebar) = &mut self.sidebar {
                    sidebar.highlight(route);
                }
                self.screen = AppScreen::Page(page);
                self.open_page(page, role, &session, token);
            }
        }
        Ok(())
    }

    fn open_page(&mut self, page: Page, role: Role, session: &Session, token: ViewToken) {
        let user_id = session.user_id().map(str::to_string);
        match page {
            Page::Overview => self.open_stats(StatsPage::Overview, token),
            Page::Sales => self.open_stats(StatsPage::Sales, token),
            Page::Analytics => self.open_stats(StatsPage::Analytics, token),
            Page::Products => {
                self.products_state = Some(ProductsState::new());
                self.fetch_products(token);
            }
            Page::Users => {
                let state = UsersState::new(role);
                let accountants = state.shows_accountants();
                self.users_state = Some(state);
                self.fetch_customers(token);
                if accountants {
                    self.fetch_accountants(token);
                }
            }
            Page::Orders => {
                self.orders_state = Some(OrdersState::new(role == Role::Admin));
                self.fetch_invoices(token);
            }
            Page::CustomerOrders | Page::OrderHistory => {
                let view = if page == Page::CustomerOrders {
                    CustomerView::Dashboard
                } else {
                    CustomerView::History
                };
                self.customer_orders_state = Some(CustomerOrdersState::new(view, user_id.clone()));
                if let Some(id) = user_id {
                    self.fetch_customer_invoices(token, id);
                }
            }
            Page::Settings(role) => {
                self.settings_state = Some(SettingsState::new(role, user_id.clone()));
                if let Some(id) = user_id {
                    self.fetch_profile(token, role, id);
                }
            }
            Page::InvoiceCreation => {
                self.invoice_wizard_state = Some(InvoiceWizardState::new());
                self.fetch_wizard_lookups(token);
            }
            Page::PaymentSuccess => {}
        }
    }

    fn open_stats(&mut self, page: StatsPage, token: ViewToken) {
        self.stats_state = Some(StatsState::new(page));
        for &key in page.keys() {
            let client = self.client.clone();
            self.spawn(token, async move { Payload::Stat(key, text_err(client.stat(key).await)) });
        }
        if page.has_daily_sales() {
            let client = self.client.clone();
            self.spawn(token, async move {
                Payload::DailySales(text_err(client.daily_sales().await))
            });
        }
    }

    fn fetch_products(&self, token: ViewToken) {
        let client = self.client.clone();
        self.spawn(token, async move { Payload::Products(text_err(client.list_products().await)) });
    }

    fn fetch_customers(&self, token: ViewToken) {
        let client = self.client.clone();
        self.spawn(token, async move { Payload::Customers(text_err(client.list_customers().await)) });
    }

    fn fetch_accountants(&self, token: ViewToken) {
        let client = self.client.clone();
        self.spawn(token, async move {
            Payload::Accountants(text_err(client.list_accountants().await))
        });
    }

    fn fetch_invoices(&self, token: ViewToken) {
        let client = self.client.clone();
        self.spawn(token, async move { Payload::Invoices(text_err(client.list_invoices().await)) });
    }

    fn fetch_customer_invoices(&self, token: ViewToken, customer_id: String) {
        let client = self.client.clone();
        self.spawn(token, async move {
            Payload::Invoices(text_err(client.customer_invoices(&customer_id).await))
        });
    }

    fn fetch_profile(&self, token: ViewToken, role: Role, user_id: String) {
        let client = self.client.clone();
        self.spawn(token, async move {
            let profile = match role {
                Role::Admin => client.admin_details(&user_id).await.map(Profile::Admin),
                Role::Accountant => client.accountant_info(&user_id).await.map(Profile::Accountant),
                Role::Customer => client.customer_info(&user_id).await.map(Profile::Customer),
            };
            Payload::Profile(text_err(profile))
        });
    }

    fn fetch_wizard_lookups(&self, token: ViewToken) {
        let client = self.client.clone();
        self.spawn(token, async move {
            Payload::WizardCustomers(text_err(client.list_customers().await))
        });
        let client = self.client.clone();
        self.spawn(token, async move {
            Payload::WizardProducts(text_err(client.list_products().await))
        });
    }

    fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        self.sidebar = None;
        tracing::info!("signed out");
        self.navigate(Route::Welcome)
    }

    /// Returns `true` when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        if self.payment.is_open() {
            if let Some(request) = handle_payment_input(&mut self.payment, key.code) {
                let client = self.client.clone();
                self.spawn(self.guard.current(), async move {
                    Payload::Payment(client.pay_invoice(request.customer_id, request.invoice_id).await)
                });
            }
            return Ok(false);
        }

        if let AppScreen::Page(_) = self.screen {
            if key.code == KeyCode::Tab {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Content,
                    Focus::Content => Focus::Sidebar,
                };
                return Ok(false);
            }
            if self.focus == Focus::Sidebar {
                return self.handle_sidebar_key(key.code).map(|_| false);
            }
        }

        let token = self.guard.current();
        match self.screen {
            AppScreen::Welcome => self.handle_welcome_screen(key.code),
            AppScreen::Contact => self.handle_contact_screen(key.code, token).map(|_| false),
            AppScreen::Login => self.handle_login_screen(key.code, token).map(|_| false),
            AppScreen::Page(page) => {
                self.handle_page(page, key.code, token);
                Ok(false)
            }
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyCode) -> Result<()> {
        let Some(sidebar) = &mut self.sidebar else {
            return Ok(());
        };
        match key {
            KeyCode::Down => sidebar.next(),
            KeyCode::Up => sidebar.previous(),
            KeyCode::Char('m') => sidebar.toggle(),
            KeyCode::Esc => self.focus = Focus::Content,
            KeyCode::Enter => match sidebar.activate() {
                NavAction::Navigate(route) => return self.navigate(route),
                NavAction::Logout => return self.logout(),
            },
            _ => {}
        }
        Ok(())
    }

    fn handle_welcome_screen(&mut self, key: KeyCode) -> Result<bool> {
        let Some(state) = &mut self.welcome_state else {
            return Ok(false);
        };
        match handle_welcome_input(state, key) {
            Some(WelcomeAction::Open(route)) => self.navigate(route)?,
            Some(WelcomeAction::Quit) => return Ok(true),
            None => {}
        }
        Ok(false)
    }

    fn handle_contact_screen(&mut self, key: KeyCode, token: ViewToken) -> Result<()> {
        let Some(state) = &mut self.contact_state else {
            return Ok(());
        };
        match handle_contact_input(state, key) {
            Some(ContactAction::Back) => self.navigate(Route::Welcome)?,
            Some(ContactAction::Send(message)) => {
                let client = self.client.clone();
                self.spawn(token, async move {
                    Payload::ContactSent(client.send_contact(&message).await)
                });
            }
            None => {}
        }
        Ok(())
    }

    fn handle_login_screen(&mut self, key: KeyCode, token: ViewToken) -> Result<()> {
        let Some(state) = &mut self.login_state else {
            return Ok(());
        };
        match handle_login_input(state, key) {
            Some(LoginAction::Back) => self.navigate(Route::Welcome)?,
            Some(LoginAction::Submit(role, credentials)) => {
                let client = self.client.clone();
                self.spawn(token, async move {
                    Payload::LoggedIn(role, client.login(role, &credentials).await)
                });
            }
            None => {}
        }
        Ok(())
    }

    fn handle_page(&mut self, page: Page, key: KeyCode, token: ViewToken) {
        match page {
            Page::Overview | Page::Sales | Page::Analytics => {
                let Some(state) = &mut self.stats_state else {
                    return;
                };
                if let Some(StatsAction::Refresh) = handle_stats_input(state, key) {
                    let stats_page = state.page;
                    let fresh = self.guard.activate();
                    self.open_stats(stats_page, fresh);
                }
            }
            Page::Products => self.handle_products_screen(key, token),
            Page::Users => self.handle_users_screen(key, token),
            Page::Orders => self.handle_orders_screen(key, token),
            Page::CustomerOrders | Page::OrderHistory => {
                let Some(state) = &mut self.customer_orders_state else {
                    return;
                };
                match handle_customer_orders_input(state, key) {
                    Some(CustomerOrderAction::Refresh) => {
                        if let Some(id) = state.customer_id.clone() {
                            self.fetch_customer_invoices(token, id);
                        }
                    }
                    Some(CustomerOrderAction::Pay(invoice)) => {
                        self.payment_origin = self.route;
                        self.payment.open(invoice);
                    }
                    None => {}
                }
            }
            Page::Settings(_) => self.handle_settings_screen(key, token),
            Page::InvoiceCreation => self.handle_invoice_wizard_screen(key, token),
            Page::PaymentSuccess => {}
        }
    }

    fn handle_products_screen(&mut self, key: KeyCode, token: ViewToken) {
        let Some(state) = &mut self.products_state else {
            return;
        };
        let client = self.client.clone();
        match handle_products_input(state, key) {
            Some(ProductAction::Refresh) => self.fetch_products(token),
            Some(ProductAction::Create(draft)) => self.spawn(token, async move {
                let result = client.add_product(&draft).await;
                let refreshed = match result {
                    Ok(()) => Some(text_err(client.list_products().await)),
                    Err(_) => None,
                };
                Payload::ProductChanged(Mutation::Created { result, refreshed })
            }),
            Some(ProductAction::Update(product)) => self.spawn(token, async move {
                let result = client.update_product(&product).await;
                Payload::ProductChanged(Mutation::Updated { record: product, result })
            }),
            Some(ProductAction::Delete(id)) => self.spawn(token, async move {
                let result = client.delete_product(id).await;
                Payload::ProductChanged(Mutation::Deleted { id, result })
            }),
            None => {}
        }
    }

    fn handle_users_screen(&mut self, key: KeyCode, token: ViewToken) {
        let Some(state) = &mut self.users_state else {
            return;
        };
        let client = self.client.clone();
        match handle_users_input(state, key) {
            Some(UserAction::RefreshCustomers) => self.fetch_customers(token),
            Some(UserAction::RefreshAccountants) => self.fetch_accountants(token),
            Some(UserAction::CreateCustomer(draft)) => self.spawn(token, async move {
                let result = client.create_customer(&draft).await;
                let refreshed = match result {
                    Ok(()) => Some(text_err(client.list_customers().await)),
                    Err(_) => None,
                };
                Payload::CustomerChanged(Mutation::Created { result, refreshed })
            }),
            Some(UserAction::UpdateCustomer(customer)) => self.spawn(token, async move {
                let result = client.update_customer(&customer).await;
                Payload::CustomerChanged(Mutation::Updated { record: customer, result })
            }),
            Some(UserAction::DeleteCustomer(id)) => self.spawn(token, async move {
                let result = client.delete_customer(id).await;
                Payload::CustomerChanged(Mutation::Deleted { id, result })
            }),
            Some(UserAction::CreateAccountant(draft)) => self.spawn(token, async move {
                let result = client.create_accountant(&draft).await;
                let refreshed = match result {
                    Ok(()) => Some(text_err(client.list_accountants().await)),
                    Err(_) => None,
                };
                Payload::AccountantChanged(Mutation::Created { result, refreshed })
            }),
            Some(UserAction::UpdateAccountant(accountant)) => self.spawn(token, async move {
                let result = client.update_accountant(&accountant).await;
                Payload::AccountantChanged(Mutation::Updated { record: accountant, result })
            }),
            None => {}
        }
    }

    fn handle_orders_screen(&mut self, key: KeyCode, token: ViewToken) {
        let Some(state) = &mut self.orders_state else {
            return;
        };
        match handle_orders_input(state, key) {
            Some(OrderAction::Refresh) => self.fetch_invoices(token),
            Some(OrderAction::Delete(id)) => {
                let client = self.client.clone();
                self.spawn(token, async move {
                    Payload::InvoiceDeleted(id, client.delete_invoice(id).await)
                });
            }
            None => {}
        }
    }

    fn handle_settings_screen(&mut self, key: KeyCode, token: ViewToken) {
        let Some(state) = &mut self.settings_state else {
            return;
        };
        let client = self.client.clone();
        match handle_settings_input(state, key) {
            Some(SettingsAction::Save(profile)) => self.spawn(token, async move {
                let result = match &profile {
                    Profile::Admin(admin) => client.update_admin(admin).await,
                    Profile::Accountant(accountant) => client.update_accountant(accountant).await,
                    Profile::Customer(customer) => client.update_customer(customer).await,
                };
                Payload::ProfileSaved(result)
            }),
            Some(SettingsAction::TopUp(customer_id, amount)) => self.spawn(token, async move {
                Payload::WalletToppedUp(client.add_to_wallet(&customer_id, amount).await)
            }),
            None => {}
        }
    }

    fn handle_invoice_wizard_screen(&mut self, key: KeyCode, token: ViewToken) {
        let Some(state) = &mut self.invoice_wizard_state else {
            return;
        };
        match handle_invoice_wizard_input(state, key) {
            Some(InvoiceWizardAction::Reload) => self.fetch_wizard_lookups(token),
            Some(InvoiceWizardAction::Submit(request)) => {
                let client = self.client.clone();
                self.spawn(token, async move {
                    Payload::InvoiceCreated(client.create_invoice(&request).await)
                });
            }
            None => {}
        }
    }

    /// Apply a finished request to whatever screen is showing
    pub fn apply(&mut self, event: AppEvent) -> Result<()> {
        // A debit in flight belongs to the payment dialog, not to the page
        let payment = matches!(event.payload, Payload::Payment(_));
        if !payment && !self.guard.is_current(event.token) {
            tracing::debug!("dropping result for a page that is no longer shown");
            return Ok(());
        }

        match event.payload {
            Payload::Stat(key, result) => {
                if let Some(state) = &mut self.stats_state {
                    state.board.apply(key, result);
                }
            }
            Payload::DailySales(result) => {
                if let Some(state) = &mut self.stats_state {
                    state.daily_sales_loaded(result);
                }
            }
            Payload::Products(result) => {
                if let Some(state) = &mut self.products_state {
                    state.loaded(result);
                }
            }
            Payload::ProductChanged(mutation) => {
                if let Some(state) = &mut self.products_state {
                    state.apply(mutation);
                }
            }
            Payload::Customers(result) => {
                if let Some(state) = &mut self.users_state {
                    state.customers.loaded(result);
                }
            }
            Payload::CustomerChanged(mutation) => {
                if let Some(state) = &mut self.users_state {
                    apply_customers(state, mutation);
                }
            }
            Payload::Accountants(result) => {
                if let Some(state) = &mut self.users_state {
                    state.accountants.loaded(result);
                }
            }
            Payload::AccountantChanged(mutation) => {
                if let Some(state) = &mut self.users_state {
                    apply_accountants(state, mutation);
                }
            }
            Payload::Invoices(result) => {
                if let Some(state) = &mut self.orders_state {
                    state.table.loaded(result);
                } else if let Some(state) = &mut self.customer_orders_state {
                    state.table.loaded(result);
                }
            }
            Payload::InvoiceDeleted(id, result) => {
                if let Some(state) = &mut self.orders_state {
                    state.deleted(id, result);
                }
            }
            Payload::Profile(result) => {
                if let Some(state) = &mut self.settings_state {
                    state.loaded(result);
                }
            }
            Payload::ProfileSaved(result) => {
                if let Some(state) = &mut self.settings_state {
                    state.saved(result);
                }
            }
            Payload::WalletToppedUp(result) => {
                if let Some(state) = &mut self.settings_state {
                    state.topped_up(result);
                }
            }
            Payload::WizardCustomers(result) => {
                if let Some(state) = &mut self.invoice_wizard_state {
                    state.customers = crate::fetch::Loadable::from_result(result);
                }
            }
            Payload::WizardProducts(result) => {
                if let Some(state) = &mut self.invoice_wizard_state {
                    state.products = crate::fetch::Loadable::from_result(result);
                }
            }
            Payload::InvoiceCreated(result) => {
                let export_dir = self.config.export_dir().to_path_buf();
                let logo = self.config.invoice_logo().to_path_buf();
                if let Some(state) = &mut self.invoice_wizard_state {
                    state.created(result, |doc| {
                        let generator = InvoiceGenerator::new(&export_dir)?;
                        generator.export(doc, &MarkdownRenderer)?;
                        generator.export(doc, &PdfRenderer::with_logo_file(&logo))
                    });
                }
            }
            Payload::Payment(result) => {
                if let Some(effect) = self.payment.finish(result, Instant::now()) {
                    self.payment_effect(effect)?;
                }
            }
            Payload::LoggedIn(requested, result) => match result.and_then(|response| {
                match response.granted_role(requested) {
                    Some(role) => Ok((role, response.id)),
                    None => Err(ApiError::Parse(format!(
                        "unknown role {:?}",
                        response.role.unwrap_or_default()
                    ))),
                }
            }) {
                Ok((role, id)) => {
                    self.session.login(role, &id)?;
                    tracing::info!(%role, %requested, "signed in");
                    self.sidebar = Some(Sidebar::new(role));
                    self.navigate(Route::Dashboard)?;
                }
                Err(err) => {
                    if let Some(state) = &mut self.login_state {
                        state.fail(&err);
                    }
                }
            },
            Payload::ContactSent(result) => {
                if let Some(state) = &mut self.contact_state {
                    state.finish(result);
                }
            }
        }
        Ok(())
    }

    fn payment_effect(&mut self, effect: PaymentEffect) -> Result<()> {
        match effect {
            PaymentEffect::Navigate(route) => self.navigate(route),
            PaymentEffect::Back => self.navigate(self.payment_origin),
        }
    }

    /// Drain finished requests and advance timers
    pub fn tick(&mut self) -> Result<()> {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event)?;
        }
        if let Some(effect) = self.payment.tick(Instant::now()) {
            self.payment_effect(effect)?;
        }
        Ok(())
    }

    pub fn render<B: Backend>(&mut self, f: &mut Frame<B>) {
        let page = match self.screen {
            AppScreen::Welcome => {
                if let Some(state) = &mut self.welcome_state {
                    render_welcome(f, state);
                }
                return;
            }
            AppScreen::Contact => {
                if let Some(state) = &mut self.contact_state {
                    render_contact(f, state);
                }
                return;
            }
            AppScreen::Login => {
                if let Some(state) = &mut self.login_state {
                    render_login(f, state);
                }
                return;
            }
            AppScreen::Page(page) => page,
        };

        let width = self.sidebar.as_ref().map_or(0, Sidebar::width);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(width), Constraint::Min(20)].as_ref())
            .split(f.size());
        if let Some(sidebar) = &self.sidebar {
            render_sidebar(f, chunks[0], sidebar, self.focus == Focus::Sidebar);
        }
        let area = chunks[1];

        match page {
            Page::Overview | Page::Sales | Page::Analytics => {
                if let Some(state) = &self.stats_state {
                    render_stats(f, area, state);
                }
            }
            Page::Products => {
                if let Some(state) = &mut self.products_state {
                    render_products(f, area, state);
                }
            }
            Page::Users => {
                if let Some(state) = &mut self.users_state {
                    render_users(f, area, state);
                }
            }
            Page::Orders => {
                if let Some(state) = &mut self.orders_state {
                    render_orders(f, area, state);
                }
            }
            Page::CustomerOrders | Page::OrderHistory => {
                if let Some(state) = &mut self.customer_orders_state {
                    render_customer_orders(f, area, state);
                }
            }
            Page::Settings(_) => {
                if let Some(state) = &mut self.settings_state {
                    render_settings(f, area, state);
                }
            }
            Page::InvoiceCreation => {
                if let Some(state) = &mut self.invoice_wizard_state {
                    render_invoice_wizard(f, area, state);
                }
            }
            Page::PaymentSuccess => render_payment_success(f, area, &self.payment),
        }

        if self.payment.is_open() {
            render_payment_popup(f, area, &self.payment);
        }
    }
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    app.start()?;
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key)? {
                    break;
                }
            }
        }

        app.tick()?;
    }
    Ok(())
}
