//! pos-service: single-register point-of-sale invoicing engine.
//!
//! Builds invoices line by line, commits them as header and detail records
//! to a remote record store, and reads them back for viewing and reprint.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod store;
