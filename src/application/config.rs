// エンジン設定

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CELL_SIZE, DEFAULT_DESTROY_PAUSE, DEFAULT_FALL_SPEED, DEFAULT_H, DEFAULT_MATCH_MIN,
    DEFAULT_ROW_DELAY, DEFAULT_SWAP_SPEED, DEFAULT_W,
};
use crate::domain::tile::TileKind;

/// エンジン構築時に与える静的設定（構築後は不変）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 盤面の幅
    pub width: usize,
    /// 盤面の高さ
    pub height: usize,
    /// 許可するタイル種類の集合
    pub kinds: Vec<TileKind>,
    /// マッチ成立の最小連結数
    pub match_min: usize,
    /// セル1辺のワールド座標サイズ
    pub cell_size: f32,
    /// 落下速度（ワールド座標/秒）
    pub fall_speed: f32,
    /// スワップ移動速度
    pub swap_speed: f32,
    /// 行生成の間隔（秒）
    pub row_delay: f32,
    /// 消去後のポーズ（秒）
    pub destroy_pause: f32,
    /// 乱数シード（Noneなら非決定）
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_W,
            height: DEFAULT_H,
            kinds: (0..5).map(TileKind::normal).collect(),
            match_min: DEFAULT_MATCH_MIN,
            cell_size: DEFAULT_CELL_SIZE,
            fall_speed: DEFAULT_FALL_SPEED,
            swap_speed: DEFAULT_SWAP_SPEED,
            row_delay: DEFAULT_ROW_DELAY,
            destroy_pause: DEFAULT_DESTROY_PAUSE,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// 設定の検証（不正な設定は起動時の致命的エラー）
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!("盤面サイズは1以上である必要があります"));
        }
        if self.kinds.is_empty() {
            return Err(anyhow!("許可タイル種類が空です"));
        }
        if self.match_min < 2 {
            return Err(anyhow!("マッチ最小連結数は2以上である必要があります"));
        }
        if self.fall_speed <= 0.0 || self.swap_speed <= 0.0 {
            return Err(anyhow!("移動速度は正の値である必要があります"));
        }
        if self.row_delay < 0.0 || self.destroy_pause < 0.0 {
            return Err(anyhow!("待ち時間は負にできません"));
        }
        Ok(())
    }

    /// セル座標からワールド座標への変換
    pub fn world_pos(&self, x: usize, y: usize) -> (f32, f32) {
        (x as f32 * self.cell_size, y as f32 * self.cell_size)
    }

    /// 盤面上端より offset_rows 行だけ上のスポーン位置
    pub fn spawn_pos(&self, x: usize, offset_rows: usize) -> (f32, f32) {
        (
            x as f32 * self.cell_size,
            (self.height + offset_rows) as f32 * self.cell_size,
        )
    }
}
