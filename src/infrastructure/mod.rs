// インフラ層 - 外部コラボレータの契約と既定実装

pub mod recorder;
pub mod visual;

pub use recorder::{FileReportWriter, MemoryReportWriter, ReportWriter, SessionRecord};
pub use visual::{InstantMover, LinearMover, NullVisuals, TileMover, TileVisuals, VisualHandle};
