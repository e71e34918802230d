// タイル型定義（ドメイン層）

use serde::{Deserialize, Serialize};

/// タイルの特殊種別タグ
///
/// 元実装が宣言するだけで消去ルールを持たない種別も含む。
/// マッチ判定には一切関与しない不活性データとして保持する。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileVariant {
    #[default]
    Normal,
    StripedHorizontal,
    StripedVertical,
    Wrapped,
    ColorBomb,
    Fish,
}

/// タイルの種類: 色インデックスと特殊種別タグ
///
/// マッチ等価性は色のみで決まる（`same_color`）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileKind {
    pub color: u8,
    pub variant: TileVariant,
}

impl TileKind {
    /// 通常タイルの種類を作成
    pub fn normal(color: u8) -> Self {
        Self {
            color,
            variant: TileVariant::Normal,
        }
    }

    /// マッチ判定用の色一致
    #[inline]
    pub fn same_color(&self, other: &TileKind) -> bool {
        self.color == other.color
    }
}

/// タイル個体の識別子（生成順の連番、盤面全体で一意）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u64);

/// 盤面上のタイル個体
///
/// スロットが唯一の所有者。座標はスワップ/落下時のみ更新される。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub pos: (usize, usize),
}

/// 色番号を漢字に変換（ログ用）
pub fn color_name(color: u8) -> &'static str {
    match color {
        0 => "赤",
        1 => "緑",
        2 => "青",
        3 => "黄",
        4 => "紫",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_color_ignores_variant() {
        let a = TileKind::normal(2);
        let b = TileKind {
            color: 2,
            variant: TileVariant::ColorBomb,
        };
        assert!(a.same_color(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn different_color_is_not_same() {
        let a = TileKind::normal(0);
        let b = TileKind::normal(1);
        assert!(!a.same_color(&b));
    }

    #[test]
    fn default_variant_is_normal() {
        assert_eq!(TileVariant::default(), TileVariant::Normal);
    }
}
