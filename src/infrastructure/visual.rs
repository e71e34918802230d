// 可視化コラボレータの契約 - インスタンス貸与と位置移動

use std::collections::{HashMap, HashSet};

use crate::constants::SETTLE_EPS;
use crate::domain::tile::TileKind;

/// 可視化インスタンスのハンドル
///
/// プール/生成の戦略は完全にコラボレータ側の関心事で、エンジンは
/// ハンドルの貸与と返却だけを行う。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// タイル可視化の貸与契約
pub trait TileVisuals {
    /// タイル生成時に可視化インスタンスを要求
    fn acquire(&mut self, kind: TileKind) -> VisualHandle;
    /// タイル破壊時にインスタンスを返却
    fn release(&mut self, handle: VisualHandle);
    /// 選択ハイライトの表示/解除
    fn highlight(&mut self, handle: VisualHandle, on: bool);
}

/// 位置移動の契約
///
/// エンジンはスワップ・落下・スポーンの移動意図を発行し、全移動が
/// 目標位置の許容誤差内に収まる（=着地）まで各段階の進行を待つ。
/// 補間の計算はエンジンの関心事ではない。
pub trait TileMover {
    /// 移動意図を登録
    fn move_to(&mut self, handle: VisualHandle, from: (f32, f32), to: (f32, f32), speed: f32);
    /// 外部のフレームティックで進行
    fn advance(&mut self, dt: f32);
    /// 全移動が着地済みかチェック
    fn all_settled(&self) -> bool;
}

/// 何も描画しない可視化実装（計数のみ、ヘッドレス実行とテスト用）
#[derive(Debug, Default)]
pub struct NullVisuals {
    next: u64,
    live: u64,
    acquired_total: u64,
    released_total: u64,
    highlighted: HashSet<VisualHandle>,
}

impl NullVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在貸与中のインスタンス数
    pub fn live(&self) -> u64 {
        self.live
    }

    pub fn acquired_total(&self) -> u64 {
        self.acquired_total
    }

    pub fn released_total(&self) -> u64 {
        self.released_total
    }

    /// ハイライト中のインスタンス数
    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }
}

impl TileVisuals for NullVisuals {
    fn acquire(&mut self, _kind: TileKind) -> VisualHandle {
        self.next += 1;
        self.live += 1;
        self.acquired_total += 1;
        VisualHandle(self.next)
    }

    fn release(&mut self, handle: VisualHandle) {
        self.live = self.live.saturating_sub(1);
        self.released_total += 1;
        // 返却されたインスタンスはハイライトを持ち越さない
        self.highlighted.remove(&handle);
    }

    fn highlight(&mut self, handle: VisualHandle, on: bool) {
        if on {
            self.highlighted.insert(handle);
        } else {
            self.highlighted.remove(&handle);
        }
    }
}

/// 即時完了する移動実装（論理検証用）
#[derive(Debug, Default)]
pub struct InstantMover;

impl TileMover for InstantMover {
    fn move_to(&mut self, _handle: VisualHandle, _from: (f32, f32), _to: (f32, f32), _speed: f32) {}

    fn advance(&mut self, _dt: f32) {}

    fn all_settled(&self) -> bool {
        true
    }
}

struct PendingMove {
    pos: (f32, f32),
    target: (f32, f32),
    speed: f32,
}

/// 等速補間の移動実装
///
/// ティックごとに speed*dt だけ目標へ近づける。同一ハンドルへの
/// 新しい移動指示は前の指示を上書きする。着地した移動は追跡から
/// 外れるため、セッションが長引いても登録数は飛行中の分だけに保たれる。
#[derive(Default)]
pub struct LinearMover {
    pending: HashMap<VisualHandle, PendingMove>,
}

impl LinearMover {
    pub fn new() -> Self {
        Self::default()
    }

    /// 飛行中の表示位置（着地済みは追跡から外れ None）
    pub fn position_of(&self, handle: VisualHandle) -> Option<(f32, f32)> {
        self.pending.get(&handle).map(|m| m.pos)
    }

    /// 追跡中の移動数
    pub fn tracked(&self) -> usize {
        self.pending.len()
    }
}

impl TileMover for LinearMover {
    fn move_to(&mut self, handle: VisualHandle, from: (f32, f32), to: (f32, f32), speed: f32) {
        self.pending.insert(
            handle,
            PendingMove {
                pos: from,
                target: to,
                speed,
            },
        );
    }

    fn advance(&mut self, dt: f32) {
        for m in self.pending.values_mut() {
            let dx = m.target.0 - m.pos.0;
            let dy = m.target.1 - m.pos.1;
            let dist = (dx * dx + dy * dy).sqrt();
            let step = m.speed * dt;
            if dist <= step || dist <= SETTLE_EPS {
                m.pos = m.target;
            } else {
                m.pos.0 += dx / dist * step;
                m.pos.1 += dy / dist * step;
            }
        }
        self.pending.retain(|_, m| m.pos != m.target);
    }

    fn all_settled(&self) -> bool {
        self.pending.values().all(|m| {
            let dx = m.target.0 - m.pos.0;
            let dy = m.target.1 - m.pos.1;
            dx.abs() <= SETTLE_EPS && dy.abs() <= SETTLE_EPS
        })
    }
}
