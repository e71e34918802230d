// 実行ログ - エンジン進行の詳細トレースをファイルへ書き出す

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// 詳細ログの有効フラグ
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// ログの出力先（未初期化なら書き込みは黙って捨てられる）
static SINK: Mutex<Option<File>> = Mutex::new(None);

/// ログファイルを開いて詳細ログを有効にする
///
/// 工場のフォールバック、カスケードの各波、エンジンの段階遷移と
/// 破棄された入力がここへ流れる。
pub fn init_log_file(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("ログファイルを開けません: {}", path.display()))?;
    let mut sink = SINK.lock().unwrap();
    *sink = Some(file);
    set_verbose(true);
    Ok(())
}

/// 詳細ログの有効/無効を切り替える
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

/// 詳細ログが有効かチェック
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// 1行書き込んで即フラッシュする（進行と同期して追跡できるように）
pub fn write_log(message: &str) {
    if let Ok(mut sink) = SINK.lock() {
        if let Some(ref mut file) = *sink {
            let _ = writeln!(file, "{}", message);
            let _ = file.flush();
        }
    }
}

/// 詳細ログ出力マクロ
#[macro_export]
macro_rules! vlog {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            $crate::logging::write_log(&format!($($arg)*));
        }
    };
}
