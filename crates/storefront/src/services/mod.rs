//! Application services.
//!
//! Services orchestrate repositories and external collaborators on behalf of
//! the route handlers:
//!
//! - [`auth`] - Registration, login, and password reset
//! - [`checkout`] - The cart-to-order transition
//! - [`invoice`] - PDF invoice generation with dual-sink streaming
//! - [`mail`] - Outbound mail (SMTP or log-only)
//! - [`storage`] - Product images and invoice archives on disk

pub mod auth;
pub mod checkout;
pub mod invoice;
pub mod mail;
pub mod storage;
