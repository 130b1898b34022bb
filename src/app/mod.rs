//! Terminal front end: state management, event handling, and action dispatch.

pub mod action;
pub mod event;
pub mod handler;
pub mod session;
pub mod state;
