//! Injected scripts.
//!
//! `page` and `cookie` hold function bodies handed to [`hireflow_core::Driver::execute`];
//! they read their inputs from `arguments`. `element` and `wait` are full function
//! declarations the Chromium backend binds to an element or document as `this`.

pub mod element;
pub mod wait;
pub mod cookie;
pub mod page;
