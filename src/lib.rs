// マッチ3エンジン - ライブラリモジュール

pub mod constants;
pub mod domain;         // ドメイン層
pub mod application;    // アプリケーション層
pub mod infrastructure; // インフラ層
pub mod logging;

// 外部クレートの再エクスポート
pub use anyhow::{anyhow, Context, Result};

// 主要な型を再エクスポート
pub use application::{
    CascadeOutcome, CascadeResolver, CascadeStep, Engine, EngineConfig, FallMove, InputOutcome,
    Phase, Selection,
};
pub use domain::{
    connected_cells, find_all_matches, find_line_match_at, Grid, MatchGroup, Pos, Tile,
    TileFactory, TileId, TileKind, TileVariant,
};
pub use infrastructure::{
    FileReportWriter, InstantMover, LinearMover, MemoryReportWriter, NullVisuals, ReportWriter,
    SessionRecord, TileMover, TileVisuals, VisualHandle,
};
