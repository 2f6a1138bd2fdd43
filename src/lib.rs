pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use db::{create_pool, PgStore};
pub use error::BillingError;
pub use service::{classify, InvoiceAssembler, TicketEnricher};
pub use store::MemoryStore;
