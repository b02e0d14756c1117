//! View models rendered by whatever front-end drives the dashboard

pub mod banner;
pub mod grid;
pub mod modal;

pub use banner::{DataMode, StatusBanner};
pub use grid::{CardState, ServiceCard, ServiceGrid};
pub use modal::{CategoryGroup, RamTotals, ServiceManagerModal, ServiceRow};
