// Grid型 - width×height の盤面を表現

use anyhow::{anyhow, Result};

use crate::domain::tile::Tile;

/// 盤面座標
pub type Pos = (usize, usize);

/// width×height の盤面
///
/// (0,0) は左下隅。y=0 が底で、落下は y の小さい方へ向かう。
/// 空スロットは落下/補充の過渡状態でのみ存在する。
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    slots: Vec<Option<Tile>>,
}

impl Grid {
    /// 新しい空の盤面を作成
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("盤面サイズが不正: {}x{}", width, height));
        }
        Ok(Self {
            width,
            height,
            slots: vec![None; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 座標が範囲内かチェック
    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// タイルを取得（範囲外はNone）
    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.slots[y * self.width + x].as_ref()
    }

    /// スロットを設定（既存タイルは上書き）
    pub fn set(&mut self, x: usize, y: usize, tile: Option<Tile>) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(anyhow!("座標が範囲外: ({}, {})", x, y));
        }
        self.slots[y * self.width + x] = tile;
        Ok(())
    }

    /// スロットからタイルを取り出して空にする
    pub fn take(&mut self, x: usize, y: usize) -> Result<Option<Tile>> {
        if !self.in_bounds(x, y) {
            return Err(anyhow!("座標が範囲外: ({}, {})", x, y));
        }
        Ok(self.slots[y * self.width + x].take())
    }

    /// 2スロットの占有者を交換し、各タイルの座標を更新する
    pub fn swap(&mut self, p1: Pos, p2: Pos) -> Result<()> {
        if !self.in_bounds(p1.0, p1.1) {
            return Err(anyhow!("座標が範囲外: ({}, {})", p1.0, p1.1));
        }
        if !self.in_bounds(p2.0, p2.1) {
            return Err(anyhow!("座標が範囲外: ({}, {})", p2.0, p2.1));
        }
        let i1 = p1.1 * self.width + p1.0;
        let i2 = p2.1 * self.width + p2.0;
        self.slots.swap(i1, i2);
        if let Some(ref mut t) = self.slots[i1] {
            t.pos = p1;
        }
        if let Some(ref mut t) = self.slots[i2] {
            t.pos = p2;
        }
        Ok(())
    }

    /// 空スロットが1つも無いかチェック
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// 占有スロットを走査（y昇順、x昇順）
    pub fn iter_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }
}
