//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Roles, access policy, passwords, unified login
//! - `error` - Domain error taxonomy
//! - `form` - Form field rules and error collection
//! - `ledger` - Merchants, transactions, amounts, list filters
//! - `reports` - Revenue ranking and dashboard types

pub mod auth;
pub mod error;
pub mod form;
pub mod ledger;
pub mod reports;

pub use error::DomainError;
