//! Interactive dashboard for a static table of short-term rental listings.
//!
//! `data` loads, filters and aggregates; `view` shapes the results for
//! display; `ui` and `app` draw them with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
pub mod view;
