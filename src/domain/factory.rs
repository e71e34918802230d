// タイル生成 - 配置制約付きの種類選択とID採番

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::MAX_PLACE_ATTEMPTS;
use crate::domain::grid::Grid;
use crate::domain::tile::{color_name, Tile, TileId, TileKind};
use crate::vlog;

/// タイル工場
///
/// 許可された種類集合から色を選ぶ。初期生成時は「既に置かれた隣接タイルと
/// 同色にならない」制約付き、補充時は無制約。生成した全タイルに一意のIDを
/// 採番する。
pub struct TileFactory {
    kinds: Vec<TileKind>,
    rng: StdRng,
    next_id: u64,
    fallback_count: u64,
}

impl TileFactory {
    /// 新しい工場を作成（種類集合が空なら起動時エラー）
    pub fn new(kinds: Vec<TileKind>) -> Result<Self> {
        Self::with_seed(kinds, rand::thread_rng().gen())
    }

    /// シード指定で作成（テスト・再現用）
    pub fn with_seed(kinds: Vec<TileKind>, seed: u64) -> Result<Self> {
        if kinds.is_empty() {
            return Err(anyhow!("許可タイル種類が空です"));
        }
        Ok(Self {
            kinds,
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
            fallback_count: 0,
        })
    }

    pub fn kinds(&self) -> &[TileKind] {
        &self.kinds
    }

    /// フォールバック経路を通った回数
    pub fn fallback_count(&self) -> u64 {
        self.fallback_count
    }

    /// 座標(x,y)に置く種類を制約付きで選ぶ
    ///
    /// 生成は下の行から row-major に進むため、検査対象は「既に置かれた」
    /// 左・右・下の隣接タイルのみ。一様サンプリングを最大100回試行し、
    /// 尽きた場合は制約違反でも先頭の種類にフォールバックする（初回の
    /// カスケード掃引で回収される前提の、意図された脱出口）。
    pub fn choose(&mut self, grid: &Grid, x: usize, y: usize) -> TileKind {
        for _ in 0..MAX_PLACE_ATTEMPTS {
            let candidate = self.kinds[self.rng.gen_range(0..self.kinds.len())];
            if self.is_valid_placement(grid, x, y, candidate) {
                return candidate;
            }
        }
        self.fallback_count += 1;
        vlog!(
            "[工場] 配置リトライ上限到達: ({},{}) → 先頭色{}にフォールバック",
            x,
            y,
            color_name(self.kinds[0].color)
        );
        self.kinds[0]
    }

    /// 候補色が隣接する既置タイルと同色にならないかチェック
    fn is_valid_placement(&self, grid: &Grid, x: usize, y: usize, candidate: TileKind) -> bool {
        if x > 0 {
            if let Some(t) = grid.get(x - 1, y) {
                if t.kind.same_color(&candidate) {
                    return false;
                }
            }
        }
        if let Some(t) = grid.get(x + 1, y) {
            if t.kind.same_color(&candidate) {
                return false;
            }
        }
        if y > 0 {
            if let Some(t) = grid.get(x, y - 1) {
                if t.kind.same_color(&candidate) {
                    return false;
                }
            }
        }
        true
    }

    /// 補充用の無制約な種類選択
    ///
    /// 新規タイルがマッチを完成させることは合法で、それがカスケードの
    /// 再トリガーになる。
    pub fn spawn_kind(&mut self) -> TileKind {
        self.kinds[self.rng.gen_range(0..self.kinds.len())]
    }

    /// タイル個体を作成してIDを採番
    pub fn create(&mut self, kind: TileKind, pos: (usize, usize)) -> Tile {
        let tile = Tile {
            id: TileId(self.next_id),
            kind,
            pos,
        };
        self.next_id += 1;
        tile
    }
}
