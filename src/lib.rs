//! Study progress tracker: a static subject catalog, per-topic completion
//! state persisted after every change, and completion percentages filtered by
//! the selected subject combo.

pub mod aggregate;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod notify;
pub mod panel;
pub mod progress;
pub mod state;
pub mod storage;
pub mod ui;
