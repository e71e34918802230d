// ドメイン層 - 盤面の型とアルゴリズム

pub mod detector;
pub mod factory;
pub mod grid;
pub mod tile;

pub use detector::{connected_cells, find_all_matches, find_line_match_at, MatchGroup};
pub use factory::TileFactory;
pub use grid::{Grid, Pos};
pub use tile::{Tile, TileId, TileKind, TileVariant};
