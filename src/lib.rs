//! Paginated list API: query-string pagination controls in, a standard
//! page envelope (page, links, counts, items) out.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod store;
