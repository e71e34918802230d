// セッション記録の書き込み

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::application::cascade::CascadeStep;
use crate::domain::grid::Pos;

/// 1回のスワップ（または初期掃引）に対するカスケード記録
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    /// 起点となったスワップ（初期掃引ならNone）
    pub swap: Option<(Pos, Pos)>,
    /// 消去波の履歴
    pub steps: Vec<CascadeStep>,
    /// 消えたタイル数
    pub destroyed: usize,
    /// 補充されたタイル数
    pub spawned: usize,
}

/// セッション記録を書き込むためのtrait
pub trait ReportWriter {
    /// 単一の記録を書き込む
    fn write_record(&mut self, record: &SessionRecord) -> Result<()>;

    /// 書き込みを完了（フラッシュ）
    fn flush(&mut self) -> Result<()>;

    /// 書き込んだ記録数を取得
    fn count(&self) -> u64;
}

/// ファイルへの記録書き込み実装（JSON Lines形式、1行1記録）
pub struct FileReportWriter {
    writer: BufWriter<File>,
    count: u64,
}

impl FileReportWriter {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            count: 0,
        })
    }
}

impl ReportWriter for FileReportWriter {
    fn write_record(&mut self, record: &SessionRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl Drop for FileReportWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// メモリ内記録実装（テスト用）
#[derive(Default)]
pub struct MemoryReportWriter {
    records: Vec<SessionRecord>,
}

impl MemoryReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }
}

impl ReportWriter for MemoryReportWriter {
    fn write_record(&mut self, record: &SessionRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn count(&self) -> u64 {
        self.records.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> SessionRecord {
        SessionRecord {
            swap: Some(((2, 2), (3, 2))),
            steps: vec![CascadeStep {
                step_num: 1,
                groups: vec![vec![(0, 2), (1, 2), (2, 2)]],
            }],
            destroyed: 3,
            spawned: 3,
        }
    }

    #[test]
    fn memory_writer_stores_records() {
        let mut writer = MemoryReportWriter::new();
        writer.write_record(&test_record()).unwrap();
        writer.write_record(&test_record()).unwrap();

        assert_eq!(writer.count(), 2);
        assert_eq!(writer.records().len(), 2);
    }

    #[test]
    fn memory_writer_flush_succeeds() {
        let mut writer = MemoryReportWriter::new();
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn record_serializes_to_json() {
        let json = serde_json::to_string(&test_record()).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.destroyed, 3);
        assert_eq!(back.steps.len(), 1);
    }
}
