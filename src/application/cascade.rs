// カスケード解決 - 消去→落下→補充→再走査の反復

use serde::{Deserialize, Serialize};

use crate::domain::detector::{find_all_matches, MatchGroup};
use crate::domain::factory::TileFactory;
use crate::domain::grid::{Grid, Pos};
use crate::domain::tile::Tile;
use crate::vlog;

/// 1回の消去波の記録
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CascadeStep {
    /// 消去波の番号（1始まり）
    pub step_num: usize,
    /// 消えたグループ（消去時点の座標）
    pub groups: Vec<MatchGroup>,
}

/// カスケード全体の結果
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub steps: Vec<CascadeStep>,
    pub destroyed: usize,
    pub spawned: usize,
}

/// 落下による論理移動（可視化側の移動指示に使う）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FallMove {
    pub from: Pos,
    pub to: Pos,
}

/// カスケード解決器
///
/// 各段階は同期的な論理操作で、I/Oを持たず途中失敗しない。
/// 段階関数はティック駆動のエンジンからも同期ループ(`resolve`)からも使う。
pub struct CascadeResolver {
    match_min: usize,
}

impl CascadeResolver {
    pub fn new(match_min: usize) -> Self {
        Self { match_min }
    }

    /// 全盤面走査で消去対象グループを検出
    pub fn scan(&self, grid: &Grid) -> Vec<MatchGroup> {
        find_all_matches(grid, self.match_min)
    }

    /// 消去: マッチした全スロットを空にし、除去したタイルを返す
    ///
    /// ここが外部の可視化インスタンス解放を通知する観測点になる。
    pub fn destroy(&self, grid: &mut Grid, groups: &[MatchGroup]) -> Vec<Tile> {
        let mut removed = Vec::new();
        for grp in groups {
            for &(x, y) in grp {
                // 同一走査内で座標は重複しないが、二重消去は空取り出しで無害
                if let Ok(Some(tile)) = grid.take(x, y) {
                    removed.push(tile);
                }
            }
        }
        removed
    }

    /// 落下: 列ごとに残存タイルを相対順を保ったまま底(y=0)へ詰める
    ///
    /// 色は一切変えない純粋な位置の再割り当て。移動したタイルの
    /// 移動前後座標を返す。
    pub fn collapse(&self, grid: &mut Grid) -> Vec<FallMove> {
        let mut moves = Vec::new();
        for x in 0..grid.width() {
            let mut column: Vec<Tile> = Vec::with_capacity(grid.height());
            for y in 0..grid.height() {
                if let Ok(Some(tile)) = grid.take(x, y) {
                    column.push(tile);
                }
            }
            for (y, mut tile) in column.into_iter().enumerate() {
                let from = tile.pos;
                if from != (x, y) {
                    moves.push(FallMove { from, to: (x, y) });
                }
                tile.pos = (x, y);
                // 範囲内の再配置なので失敗しない
                let _ = grid.set(x, y, Some(tile));
            }
        }
        moves
    }

    /// 補充: 落下後に残った空スロットへ無制約の新タイルを生成
    ///
    /// 生成時の同色回避制約は適用しない。新タイルがマッチを完成させる
    /// ことがループの再トリガーになる。生成した座標を返す。
    pub fn refill(&self, grid: &mut Grid, factory: &mut TileFactory) -> Vec<Pos> {
        let mut spawned = Vec::new();
        for x in 0..grid.width() {
            for y in 0..grid.height() {
                if grid.get(x, y).is_none() {
                    let kind = factory.spawn_kind();
                    let tile = factory.create(kind, (x, y));
                    let _ = grid.set(x, y, Some(tile));
                    spawned.push((x, y));
                }
            }
        }
        spawned
    }

    /// 同期ループ: マッチが無くなるまで消去→落下→補充を繰り返す
    ///
    /// 有限盤面と2色以上の種類集合では実用上必ず停止する。1色構成での
    /// 無限ループは設計上許容し、防御しない。
    pub fn resolve(&self, grid: &mut Grid, factory: &mut TileFactory) -> CascadeOutcome {
        let mut outcome = CascadeOutcome::default();
        loop {
            let groups = self.scan(grid);
            if groups.is_empty() {
                break;
            }
            let step_num = outcome.steps.len() + 1;
            vlog!(
                "[解決器] 第{}波: {}グループ消去",
                step_num,
                groups.len()
            );
            let removed = self.destroy(grid, &groups);
            outcome.destroyed += removed.len();
            outcome.steps.push(CascadeStep { step_num, groups });
            self.collapse(grid);
            outcome.spawned += self.refill(grid, factory).len();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{TileId, TileKind};

    fn grid_from_rows(rows: &[&str]) -> Grid {
        let h = rows.len();
        let w = rows[0].len();
        let mut grid = Grid::new(w, h).unwrap();
        let mut next_id = 1u64;
        for (ri, row) in rows.iter().enumerate() {
            let y = h - 1 - ri;
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let color = ch.to_digit(10).unwrap() as u8;
                grid.set(
                    x,
                    y,
                    Some(Tile {
                        id: TileId(next_id),
                        kind: TileKind::normal(color),
                        pos: (x, y),
                    }),
                )
                .unwrap();
                next_id += 1;
            }
        }
        grid
    }

    fn kinds(n: u8) -> Vec<TileKind> {
        (0..n).map(TileKind::normal).collect()
    }

    #[test]
    fn destroy_clears_exactly_the_matched_slots() {
        let mut grid = grid_from_rows(&[
            "0111", //
            "2302", //
        ]);
        let resolver = CascadeResolver::new(3);
        let groups = resolver.scan(&grid);
        assert_eq!(groups.len(), 1);

        let removed = resolver.destroy(&mut grid, &groups);
        assert_eq!(removed.len(), 3);
        assert!(grid.get(1, 1).is_none());
        assert!(grid.get(2, 1).is_none());
        assert!(grid.get(3, 1).is_none());
        assert!(grid.get(0, 1).is_some());
        assert!(grid.get(0, 0).is_some());
    }

    #[test]
    fn collapse_compacts_columns_preserving_order() {
        // 列0: 底から 1, 空, 2 → 底から 1, 2
        let mut grid = grid_from_rows(&[
            "2.", //
            "..", //
            "1.", //
        ]);
        let resolver = CascadeResolver::new(3);
        let moves = resolver.collapse(&mut grid);

        assert_eq!(grid.get(0, 0).unwrap().kind.color, 1);
        assert_eq!(grid.get(0, 1).unwrap().kind.color, 2);
        assert!(grid.get(0, 2).is_none());
        assert_eq!(
            moves,
            vec![FallMove {
                from: (0, 2),
                to: (0, 1)
            }]
        );
        // 座標フィールドも更新される
        assert_eq!(grid.get(0, 1).unwrap().pos, (0, 1));
    }

    #[test]
    fn collapse_leaves_gaps_at_column_top() {
        let mut grid = grid_from_rows(&[
            "12", //
            ".3", //
            "4.", //
        ]);
        let resolver = CascadeResolver::new(3);
        resolver.collapse(&mut grid);

        for x in 0..2 {
            assert!(grid.get(x, 0).is_some());
            assert!(grid.get(x, 1).is_some());
            assert!(grid.get(x, 2).is_none());
        }
    }

    #[test]
    fn refill_fills_every_empty_slot() {
        let mut grid = grid_from_rows(&[
            "1.", //
            ".2", //
        ]);
        let mut factory = TileFactory::with_seed(kinds(4), 5).unwrap();
        let resolver = CascadeResolver::new(3);
        let spawned = resolver.refill(&mut grid, &mut factory);

        assert_eq!(spawned.len(), 2);
        assert!(grid.is_full());
    }

    #[test]
    fn resolve_reaches_fixed_point() {
        let mut grid = grid_from_rows(&[
            "0123", //
            "1230", //
            "0001", //
        ]);
        let mut factory = TileFactory::with_seed(kinds(4), 9).unwrap();
        let resolver = CascadeResolver::new(3);
        let outcome = resolver.resolve(&mut grid, &mut factory);

        assert!(outcome.destroyed >= 3);
        assert_eq!(outcome.destroyed, outcome.spawned);
        assert!(resolver.scan(&grid).is_empty());
        assert!(grid.is_full());
    }

    #[test]
    fn resolve_on_stable_board_is_a_no_op() {
        let mut grid = grid_from_rows(&[
            "0123", //
            "1230", //
            "2301", //
        ]);
        let before = grid.clone();
        let mut factory = TileFactory::with_seed(kinds(4), 1).unwrap();
        let resolver = CascadeResolver::new(3);
        let outcome = resolver.resolve(&mut grid, &mut factory);

        assert!(outcome.steps.is_empty());
        assert_eq!(grid, before);
    }

    #[test]
    fn random_boards_terminate_within_generous_bound() {
        // 乱数盤面でのカスケード停止性（シード固定で再現可能）
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        for seed in 0..30u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::new(8, 8).unwrap();
            let mut factory = TileFactory::with_seed(kinds(4), seed).unwrap();
            for y in 0..8 {
                for x in 0..8 {
                    let kind = TileKind::normal(rng.gen_range(0..4));
                    let tile = factory.create(kind, (x, y));
                    grid.set(x, y, Some(tile)).unwrap();
                }
            }
            let resolver = CascadeResolver::new(3);
            let outcome = resolver.resolve(&mut grid, &mut factory);
            assert!(outcome.steps.len() <= 50, "seed={}", seed);
            assert!(resolver.scan(&grid).is_empty(), "seed={}", seed);
        }
    }
}
