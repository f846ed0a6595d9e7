//! Settings-page models built on top of sub-configuration discovery.

pub mod ui_page;
