// エンジン本体 - ビジーフラグとティック駆動の段階機械

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::application::cascade::{CascadeResolver, CascadeStep};
use crate::application::config::EngineConfig;
use crate::application::interaction::{InputOutcome, Selection};
use crate::domain::detector::{find_line_match_at, MatchGroup};
use crate::domain::factory::TileFactory;
use crate::domain::grid::{Grid, Pos};
use crate::domain::tile::{TileId, TileKind};
use crate::infrastructure::visual::{TileMover, TileVisuals, VisualHandle};
use crate::vlog;

/// 進行中の段階
///
/// コルーチンの代わりに、外部ティックで進める明示的な状態機械。
/// 論理状態は常に可視状態と同じか先行し、遅れることはない。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// 待機（入力受付可能）
    Idle,
    /// 初期生成: 1行ずつスポーンして落下させる
    SpawnRows { next_row: usize, wait: f32 },
    /// 初期生成の着地待ち → 開始時マッチの掃引
    InitialSettle,
    /// スワップ移動の着地待ち → マッチ判定
    SwapAnim { a: Pos, b: Pos },
    /// 巻き戻し移動の着地待ち
    RevertAnim,
    /// 消去後のポーズ → 落下と補充の適用
    DestroyPause { wait: f32 },
    /// 落下/補充移動の着地待ち → 全盤面再走査
    Falling,
}

/// マッチ3エンジン
///
/// Grid・工場・解決器・選択状態・外部コラボレータを明示的に所有する
/// （グローバル状態は持たない）。スワップまたはカスケードの進行中は
/// lock フラグが立ち、その間の入力は破棄される。盤面を変更するのは
/// 入力処理とカスケード処理のみで、どちらも lock に守られた単一の
/// 進行列の中でしか走らない。
pub struct Engine<V: TileVisuals, M: TileMover> {
    config: EngineConfig,
    grid: Grid,
    factory: TileFactory,
    resolver: CascadeResolver,
    selection: Selection,
    visuals: V,
    mover: M,
    handles: HashMap<TileId, VisualHandle>,
    phase: Phase,
    lock: bool,
    cascade_step: usize,
    history: Vec<CascadeStep>,
    destroyed_total: usize,
    spawned_total: usize,
}

impl<V: TileVisuals, M: TileMover> Engine<V, M> {
    /// エンジンを構築（設定不正は起動時エラー）
    pub fn new(config: EngineConfig, visuals: V, mover: M) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.width, config.height)?;
        let factory = match config.rng_seed {
            Some(seed) => TileFactory::with_seed(config.kinds.clone(), seed)?,
            None => TileFactory::new(config.kinds.clone())?,
        };
        let resolver = CascadeResolver::new(config.match_min);
        Ok(Self {
            config,
            grid,
            factory,
            resolver,
            selection: Selection::new(),
            visuals,
            mover,
            handles: HashMap::new(),
            phase: Phase::Idle,
            lock: false,
            cascade_step: 0,
            history: Vec::new(),
            destroyed_total: 0,
            spawned_total: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// スワップまたはカスケードが進行中かチェック
    ///
    /// 入力層はこれを見てイベントを破棄してよい（バッファはしない）。
    pub fn is_busy(&self) -> bool {
        self.lock
    }

    pub fn selection(&self) -> Option<Pos> {
        self.selection.selected()
    }

    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    pub fn mover(&self) -> &M {
        &self.mover
    }

    pub fn destroyed_total(&self) -> usize {
        self.destroyed_total
    }

    pub fn spawned_total(&self) -> usize {
        self.spawned_total
    }

    /// 蓄積した消去波履歴を取り出してクリア
    pub fn take_history(&mut self) -> Vec<CascadeStep> {
        std::mem::take(&mut self.history)
    }

    /// 盤面生成を開始（1行ずつ、row_delay間隔）
    pub fn start(&mut self) {
        vlog!("[エンジン] 盤面生成開始: {}x{}", self.config.width, self.config.height);
        self.lock = true;
        self.phase = Phase::SpawnRows {
            next_row: 0,
            wait: 0.0,
        };
    }

    /// タイル起動イベントを処理
    ///
    /// ビジー中は破棄。範囲外座標は呼び出し側の誤りとして即時エラー。
    pub fn on_tile_activated(&mut self, pos: Pos) -> Result<InputOutcome> {
        if !self.grid.in_bounds(pos.0, pos.1) {
            return Err(anyhow!("座標が範囲外: ({}, {})", pos.0, pos.1));
        }
        let outcome = self.selection.on_activated(pos, self.lock);
        match outcome {
            InputOutcome::Selected(p) => self.set_highlight(p, true),
            InputOutcome::Deselected(p) => self.set_highlight(p, false),
            InputOutcome::Reselected { prev, now } => {
                self.set_highlight(prev, false);
                self.set_highlight(now, true);
            }
            InputOutcome::SwapRequested { a, b } => {
                // b が選択中だったタイル。スワップ前にハイライトを外す
                self.set_highlight(b, false);
                self.begin_swap(a, b)?;
            }
            InputOutcome::Ignored => {
                vlog!("[エンジン] ビジー中の入力を破棄: ({}, {})", pos.0, pos.1);
            }
        }
        Ok(outcome)
    }

    /// 座標のタイルに選択ハイライトを指示する
    fn set_highlight(&mut self, pos: Pos, on: bool) {
        if let Some(tile) = self.grid.get(pos.0, pos.1) {
            if let Some(&handle) = self.handles.get(&tile.id) {
                self.visuals.highlight(handle, on);
            }
        }
    }

    /// 外部フレームティックで1段進める
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.mover.advance(dt);
        match self.phase {
            Phase::Idle => {}
            Phase::SpawnRows { next_row, wait } => {
                let wait = wait - dt;
                if wait > 0.0 {
                    self.phase = Phase::SpawnRows { next_row, wait };
                } else {
                    self.spawn_row(next_row)?;
                    if next_row + 1 == self.config.height {
                        self.phase = Phase::InitialSettle;
                    } else {
                        self.phase = Phase::SpawnRows {
                            next_row: next_row + 1,
                            wait: self.config.row_delay,
                        };
                    }
                }
            }
            Phase::InitialSettle => {
                if self.mover.all_settled() {
                    // フォールバック配置が作った開始時マッチをここで掃引する
                    let groups = self.resolver.scan(&self.grid);
                    if groups.is_empty() {
                        self.finish_sequence();
                    } else {
                        vlog!("[エンジン] 開始時マッチ{}件を掃引", groups.len());
                        self.enter_destroy(groups);
                    }
                }
            }
            Phase::SwapAnim { a, b } => {
                if self.mover.all_settled() {
                    self.evaluate_swap(a, b)?;
                }
            }
            Phase::RevertAnim => {
                if self.mover.all_settled() {
                    self.finish_sequence();
                }
            }
            Phase::DestroyPause { wait } => {
                let wait = wait - dt;
                if wait > 0.0 {
                    self.phase = Phase::DestroyPause { wait };
                } else {
                    self.apply_collapse_and_refill()?;
                    self.phase = Phase::Falling;
                }
            }
            Phase::Falling => {
                if self.mover.all_settled() {
                    let groups = self.resolver.scan(&self.grid);
                    if groups.is_empty() {
                        self.finish_sequence();
                    } else {
                        self.enter_destroy(groups);
                    }
                }
            }
        }
        Ok(())
    }

    /// ビジーが解けるまでティックを回す（ヘッドレス実行・テスト用）
    pub fn run_until_idle(&mut self, dt: f32, max_ticks: usize) -> Result<usize> {
        for i in 0..max_ticks {
            if !self.lock {
                return Ok(i);
            }
            self.tick(dt)?;
        }
        if self.lock {
            return Err(anyhow!("ティック上限{}回以内に待機状態へ戻りませんでした", max_ticks));
        }
        Ok(max_ticks)
    }

    /// プリセット盤面を読み込む（上の行から、数字=色、空スロット不可）
    ///
    /// 既存タイルの可視化インスタンスはすべて返却される。
    pub fn load_rows(&mut self, rows: &[&str]) -> Result<()> {
        if rows.len() != self.config.height {
            return Err(anyhow!(
                "行数が不正: 期待{}、実際{}",
                self.config.height,
                rows.len()
            ));
        }
        let old: Vec<VisualHandle> = self.handles.drain().map(|(_, h)| h).collect();
        for handle in old {
            self.visuals.release(handle);
        }
        let mut grid = Grid::new(self.config.width, self.config.height)?;
        for (ri, row) in rows.iter().enumerate() {
            if row.chars().count() != self.config.width {
                return Err(anyhow!(
                    "列数が不正: 期待{}、実際{}",
                    self.config.width,
                    row.chars().count()
                ));
            }
            let y = self.config.height - 1 - ri;
            for (x, ch) in row.chars().enumerate() {
                let color = ch
                    .to_digit(10)
                    .ok_or_else(|| anyhow!("不正な文字: {}", ch))? as u8;
                let kind = TileKind::normal(color);
                let tile = self.factory.create(kind, (x, y));
                let handle = self.visuals.acquire(kind);
                self.handles.insert(tile.id, handle);
                grid.set(x, y, Some(tile))?;
            }
        }
        self.grid = grid;
        self.selection.clear();
        self.phase = Phase::Idle;
        self.lock = false;
        Ok(())
    }

    /// 1行分のタイルを制約付きで生成し、上端から落下させる
    fn spawn_row(&mut self, y: usize) -> Result<()> {
        for x in 0..self.config.width {
            let kind = self.factory.choose(&self.grid, x, y);
            let tile = self.factory.create(kind, (x, y));
            let handle = self.visuals.acquire(kind);
            self.handles.insert(tile.id, handle);
            self.grid.set(x, y, Some(tile))?;
            self.mover.move_to(
                handle,
                self.config.spawn_pos(x, 0),
                self.config.world_pos(x, y),
                self.config.fall_speed,
            );
        }
        Ok(())
    }

    /// スワップを論理的に確定して移動を発行
    fn begin_swap(&mut self, a: Pos, b: Pos) -> Result<()> {
        vlog!("[エンジン] スワップ試行: ({},{}) <-> ({},{})", a.0, a.1, b.0, b.1);
        self.grid.swap(a, b)?;
        self.lock = true;
        self.issue_swap_moves(a, b, self.config.swap_speed);
        self.phase = Phase::SwapAnim { a, b };
        Ok(())
    }

    /// スワップ/巻き戻し後の両タイルへ移動指示を出す
    ///
    /// 各タイルは相手側の座標から自分の現座標へ移動する。
    fn issue_swap_moves(&mut self, a: Pos, b: Pos, speed: f32) {
        for (p, other) in [(a, b), (b, a)] {
            if let Some(tile) = self.grid.get(p.0, p.1) {
                if let Some(&handle) = self.handles.get(&tile.id) {
                    self.mover.move_to(
                        handle,
                        self.config.world_pos(other.0, other.1),
                        self.config.world_pos(p.0, p.1),
                        speed,
                    );
                }
            }
        }
    }

    /// 着地したスワップを局所ライン判定で検証し、確定か巻き戻しを選ぶ
    fn evaluate_swap(&mut self, a: Pos, b: Pos) -> Result<()> {
        let match_a = find_line_match_at(&self.grid, a.0, a.1, self.config.match_min);
        let match_b = find_line_match_at(&self.grid, b.0, b.1, self.config.match_min);

        if match_a.is_empty() && match_b.is_empty() {
            // どちらの端点もマッチ不成立 → 逆スワップで巻き戻し
            vlog!("[エンジン] スワップ不成立 → 巻き戻し");
            self.grid.swap(a, b)?;
            self.issue_swap_moves(a, b, self.config.swap_speed);
            self.phase = Phase::RevertAnim;
            return Ok(());
        }

        // 両端点のマッチ集合を重複なしで統合
        let mut groups: Vec<MatchGroup> = Vec::new();
        if !match_a.is_empty() {
            groups.push(match_a);
        }
        if !match_b.is_empty() {
            let seen: Vec<Pos> = groups.iter().flatten().copied().collect();
            let rest: MatchGroup = match_b.into_iter().filter(|p| !seen.contains(p)).collect();
            if !rest.is_empty() {
                groups.push(rest);
            }
        }
        self.enter_destroy(groups);
        Ok(())
    }

    /// 消去を即時適用し、可視化インスタンスを返却してポーズへ入る
    fn enter_destroy(&mut self, groups: Vec<MatchGroup>) {
        self.cascade_step += 1;
        vlog!(
            "[エンジン] 第{}波: {}グループ消去",
            self.cascade_step,
            groups.len()
        );
        let removed = self.resolver.destroy(&mut self.grid, &groups);
        for tile in &removed {
            if let Some(handle) = self.handles.remove(&tile.id) {
                self.visuals.release(handle);
            }
        }
        self.destroyed_total += removed.len();
        self.history.push(CascadeStep {
            step_num: self.cascade_step,
            groups,
        });
        self.phase = Phase::DestroyPause {
            wait: self.config.destroy_pause,
        };
    }

    /// 落下と補充を論理的に一括適用し、対応する移動を発行
    fn apply_collapse_and_refill(&mut self) -> Result<()> {
        let falls = self.resolver.collapse(&mut self.grid);
        for mv in &falls {
            if let Some(tile) = self.grid.get(mv.to.0, mv.to.1) {
                if let Some(&handle) = self.handles.get(&tile.id) {
                    self.mover.move_to(
                        handle,
                        self.config.world_pos(mv.from.0, mv.from.1),
                        self.config.world_pos(mv.to.0, mv.to.1),
                        self.config.fall_speed,
                    );
                }
            }
        }

        let spawned = self.resolver.refill(&mut self.grid, &mut self.factory);
        self.spawned_total += spawned.len();
        // 列ごとに下から数えて、盤面上端よりさらに上へ積んでスポーンさせる
        let mut per_column: HashMap<usize, usize> = HashMap::new();
        for &(x, y) in &spawned {
            let offset = per_column.entry(x).or_insert(0);
            let from = self.config.spawn_pos(x, *offset);
            *offset += 1;
            if let Some(tile) = self.grid.get(x, y) {
                let kind = tile.kind;
                let id = tile.id;
                let handle = self.visuals.acquire(kind);
                self.handles.insert(id, handle);
                self.mover
                    .move_to(handle, from, self.config.world_pos(x, y), self.config.fall_speed);
            }
        }
        Ok(())
    }

    /// 進行列の終端: ロック解除して待機へ戻る
    fn finish_sequence(&mut self) {
        vlog!("[エンジン] 進行列完了 → 待機");
        self.cascade_step = 0;
        self.lock = false;
        self.phase = Phase::Idle;
    }
}
