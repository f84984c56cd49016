//! Terminal console for a billing back end.
//!
//! Admins, accountants and customers sign in against the billing API and get
//! a role-specific set of pages: statistics, product and user management,
//! invoice listing and creation, wallet payments and profile settings.

pub mod api;
pub mod app;
pub mod config;
pub mod fetch;
pub mod forms;
pub mod invoice_doc;
pub mod invoice_form;
pub mod invoice_gen;
pub mod listing;
pub mod models;
pub mod nav;
pub mod payment;
pub mod routes;
pub mod session;
pub mod telemetry;
pub mod ui;
