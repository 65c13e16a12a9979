//! Pagination over listing pages.

pub mod crawler;
pub mod paginator;
pub mod web;

pub use crawler::PageSource;
pub use paginator::{PaginationConfig, Paginator, RunReport, RunState, StopReason};
pub use web::WebDriverSource;
