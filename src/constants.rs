// 盤面定数とエンジン既定値

/// ====== 盤面既定値 ======
pub const DEFAULT_W: usize = 8;
pub const DEFAULT_H: usize = 8;

/// マッチ成立の最小連結数
pub const DEFAULT_MATCH_MIN: usize = 3;

/// 配置制約のリトライ上限（超過時は先頭色にフォールバック）
pub const MAX_PLACE_ATTEMPTS: usize = 100;

/// ====== アニメーション既定値 ======
/// セル1辺のワールド座標サイズ
pub const DEFAULT_CELL_SIZE: f32 = 100.0;
/// 落下速度（ワールド座標/秒）
pub const DEFAULT_FALL_SPEED: f32 = 400.0;
/// スワップ移動速度
pub const DEFAULT_SWAP_SPEED: f32 = 700.0;
/// 行生成の間隔（秒）
pub const DEFAULT_ROW_DELAY: f32 = 0.2;
/// 消去後のポーズ（秒）
pub const DEFAULT_DESTROY_PAUSE: f32 = 0.2;

/// 「着地済み」と見なす位置誤差
pub const SETTLE_EPS: f32 = 0.05;
