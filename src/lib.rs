//! SecureComm: a TLS group-chat client.
//!
//! The [`net`] and [`protocol`] modules form the client core. [`app`] and
//! [`ui`] are the terminal front end built on top of it.

pub mod app;
pub mod config;
pub mod logging;
pub mod net;
pub mod protocol;
pub mod ui;
