// 入力制御 - タイル選択と隣接スワップ要求の状態機械

use crate::domain::grid::Pos;

/// 入力1件に対する遷移結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// 新規選択
    Selected(Pos),
    /// 同一セル再タップで解除
    Deselected(Pos),
    /// 非隣接セルへ選択を移動（スワップは行わない）
    Reselected { prev: Pos, now: Pos },
    /// 隣接セルとのスワップ要求（選択は解除済み）
    SwapRequested { a: Pos, b: Pos },
    /// ビジー中のため破棄
    Ignored,
}

/// 選択状態（常に高々1座標）
#[derive(Clone, Copy, Debug, Default)]
pub struct Selection {
    selected: Option<Pos>,
}

/// マンハッタン距離がちょうど1かチェック
pub fn is_neighbor(a: Pos, b: Pos) -> bool {
    let dx = a.0.abs_diff(b.0);
    let dy = a.1.abs_diff(b.1);
    dx + dy == 1
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    /// 選択を解除（スワップ確定/巻き戻し時にも呼ばれる）
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// タイル起動イベントを処理
    ///
    /// busy 中の入力はバッファせず破棄する（観測された挙動どおり）。
    pub fn on_activated(&mut self, pos: Pos, busy: bool) -> InputOutcome {
        if busy {
            return InputOutcome::Ignored;
        }
        let Some(prev) = self.selected else {
            self.selected = Some(pos);
            return InputOutcome::Selected(pos);
        };
        if pos == prev {
            self.selected = None;
            return InputOutcome::Deselected(pos);
        }
        if is_neighbor(prev, pos) {
            self.selected = None;
            return InputOutcome::SwapRequested { a: pos, b: prev };
        }
        self.selected = Some(pos);
        InputOutcome::Reselected { prev, now: pos }
    }
}
