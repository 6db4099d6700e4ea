//! Domain types for SetupLab

pub mod bar;
pub mod decision;
pub mod series;

pub use bar::{Bar, BarError};
pub use decision::{Direction, TradeDecision};
pub use series::PriceSeries;
