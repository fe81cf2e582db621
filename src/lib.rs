//! Filtering and chart aggregation over the adult census income extract.
//!
//! The dashboard binary is a thin egui front end over [`session::DashboardSession`];
//! everything with data semantics lives in this library.

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod session;

pub use config::DashboardConfig;
pub use error::{DataError, Result};
pub use session::DashboardSession;
