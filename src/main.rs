// ヘッドレス実行バイナリ - 盤面生成とランダムスワップのデモ

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use matchburst::logging::init_log_file;
use matchburst::{
    Engine, EngineConfig, FileReportWriter, InputOutcome, LinearMover, NullVisuals, ReportWriter,
    SessionRecord, vlog,
};

// ====== 実行パラメータ ======
const TICK_DT: f32 = 1.0 / 60.0;
const MAX_TICKS_PER_SEQUENCE: usize = 100_000;

struct RunArgs {
    seed: u64,
    swaps: usize,
    report_path: PathBuf,
    verbose: bool,
}

fn parse_args() -> Result<RunArgs> {
    let mut args = RunArgs {
        seed: 0,
        swaps: 50,
        report_path: PathBuf::from("session_report.jsonl"),
        verbose: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => {
                let v = it.next().ok_or_else(|| anyhow!("--seed に値がありません"))?;
                args.seed = v.parse().context("--seed の値が不正")?;
            }
            "--swaps" => {
                let v = it.next().ok_or_else(|| anyhow!("--swaps に値がありません"))?;
                args.swaps = v.parse().context("--swaps の値が不正")?;
            }
            "--report" => {
                let v = it.next().ok_or_else(|| anyhow!("--report に値がありません"))?;
                args.report_path = PathBuf::from(v);
            }
            "--verbose" => args.verbose = true,
            other => return Err(anyhow!("不明な引数: {}", other)),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    if args.verbose {
        init_log_file(Path::new("matchburst.log"))?;
    }

    let config = EngineConfig {
        rng_seed: Some(args.seed),
        ..Default::default()
    };
    let width = config.width;
    let height = config.height;
    let mut engine = Engine::new(config, NullVisuals::new(), LinearMover::new())?;
    let mut writer = FileReportWriter::new(&args.report_path)?;
    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));

    // 盤面生成（1行ずつ降ってくる）
    println!("盤面生成中: {}x{} ...", width, height);
    engine.start();
    engine.run_until_idle(TICK_DT, MAX_TICKS_PER_SEQUENCE)?;
    let sweep = engine.take_history();
    if !sweep.is_empty() {
        vlog!("[メイン] 開始時掃引: {}波", sweep.len());
        writer.write_record(&SessionRecord {
            swap: None,
            steps: sweep,
            destroyed: engine.destroyed_total(),
            spawned: engine.spawned_total(),
        })?;
    }

    // ランダムな隣接スワップを試行
    let mut accepted = 0usize;
    for _ in 0..args.swaps {
        let x = rng.gen_range(0..width - 1);
        let y = rng.gen_range(0..height);
        let destroyed_before = engine.destroyed_total();
        let spawned_before = engine.spawned_total();

        engine.on_tile_activated((x, y))?;
        let outcome = engine.on_tile_activated((x + 1, y))?;
        if !matches!(outcome, InputOutcome::SwapRequested { .. }) {
            continue;
        }
        engine.run_until_idle(TICK_DT, MAX_TICKS_PER_SEQUENCE)?;

        let steps = engine.take_history();
        if steps.is_empty() {
            continue;
        }
        accepted += 1;
        writer.write_record(&SessionRecord {
            swap: Some(((x, y), (x + 1, y))),
            steps,
            destroyed: engine.destroyed_total() - destroyed_before,
            spawned: engine.spawned_total() - spawned_before,
        })?;
    }
    writer.flush()?;

    println!(
        "完了: スワップ{}回中{}回成立、消去{}個 / 補充{}個",
        args.swaps,
        accepted,
        engine.destroyed_total(),
        engine.spawned_total()
    );
    println!("記録: {} ({}件)", args.report_path.display(), writer.count());
    Ok(())
}
