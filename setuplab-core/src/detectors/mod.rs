//! Pure scans over an immutable `PriceSeries`.
//!
//! Nothing here caches: every call rescans the full series.

pub mod fvg;
pub mod momentum;
pub mod structure;
pub mod triggers;
pub mod zones;

pub use fvg::{fvg_gap, FvgFilter};
pub use momentum::{MomentumEvaluator, MomentumSnapshot};
pub use structure::{LevelKind, MarketStructure, StructureDetector, StructureLevel, SwingPoint};
pub use triggers::{Trigger, TriggerDetector, TriggerKind};
pub use zones::{Zone, ZoneDetector, ZoneSet, ZoneSide};
