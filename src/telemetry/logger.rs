//! Rotating JSONL telemetry writer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::telemetry::types::StatusRecord;

const FILE_PREFIX: &str = "telemetry_";
const FILE_SUFFIX: &str = ".jsonl";

/// Appends status records as JSON lines, rotating files by record count.
///
/// A new file opens on the first record and after every
/// `max_records_per_file` records. After each rotation the log directory is
/// pruned down to `max_files_to_keep` telemetry files, oldest first.
pub struct TelemetryLogger {
    config: TelemetryConfig,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    file_seq: u32,
}

impl TelemetryLogger {
    /// Creates a logger, ensuring the log directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory cannot be created.
    pub fn new(config: TelemetryConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir)?;
        Ok(Self {
            config,
            writer: None,
            records_in_file: 0,
            file_seq: 0,
        })
    }

    /// Appends one record, rotating to a new file when the current one is
    /// full.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn log(&mut self, record: &StatusRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.config.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)?;
        // rotate() above guarantees a writer
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{line}")?;
            writer.flush()?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        let name = format!(
            "{FILE_PREFIX}{}_{:04}{FILE_SUFFIX}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            self.file_seq
        );
        self.file_seq += 1;

        let path = PathBuf::from(&self.config.log_dir).join(&name);
        let file = File::create(&path)?;
        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        debug!("Telemetry rotated to {}", path.display());

        self.prune();
        Ok(())
    }

    /// Removes the oldest telemetry files beyond the retention limit.
    ///
    /// Pruning failures are logged and ignored; telemetry must never take
    /// the control loop down.
    fn prune(&self) {
        let mut files: Vec<PathBuf> = match fs::read_dir(&self.config.log_dir) {
            Ok(entries) => entries
                .filter_map(std::result::Result::ok)
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
                })
                .collect(),
            Err(e) => {
                warn!("Telemetry prune skipped: {}", e);
                return;
            }
        };

        // Names embed timestamp and sequence number, so name order is age order.
        files.sort();
        while files.len() > self.config.max_files_to_keep {
            let oldest = files.remove(0);
            if let Err(e) = fs::remove_file(&oldest) {
                warn!("Failed to prune {}: {}", oldest.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuation::MotorCommand;
    use crate::health::LinkState;
    use tempfile::tempdir;

    // ==================== Telemetry Logger Tests ====================

    fn record() -> StatusRecord {
        StatusRecord {
            timestamp: Utc::now().to_rfc3339(),
            link: LinkState::Good,
            channel_widths_us: [1500, 1500, 1500],
            brake_duty: 31,
            hazard_duty: 0,
            motors: [MotorCommand::STOP, MotorCommand::STOP],
        }
    }

    fn config(dir: &std::path::Path, max_records: usize, max_files: usize) -> TelemetryConfig {
        TelemetryConfig {
            enabled: true,
            log_dir: dir.to_str().unwrap().to_string(),
            max_records_per_file: max_records,
            max_files_to_keep: max_files,
            log_interval_ms: 100,
        }
    }

    fn telemetry_files(dir: &std::path::Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_log_writes_json_lines() {
        let dir = tempdir().unwrap();
        let mut logger = TelemetryLogger::new(config(dir.path(), 100, 5)).unwrap();

        logger.log(&record()).unwrap();
        logger.log(&record()).unwrap();

        let files = telemetry_files(dir.path());
        assert_eq!(files.len(), 1);
        let contents = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|l| l.contains("\"link\":\"good\"")));
    }

    #[test]
    fn test_rotation_after_max_records() {
        let dir = tempdir().unwrap();
        let mut logger = TelemetryLogger::new(config(dir.path(), 3, 5)).unwrap();

        for _ in 0..7 {
            logger.log(&record()).unwrap();
        }

        let files = telemetry_files(dir.path());
        assert_eq!(files.len(), 3);
        let counts: Vec<usize> = files
            .iter()
            .map(|f| fs::read_to_string(f).unwrap().lines().count())
            .collect();
        assert_eq!(counts, vec![3, 3, 1]);
    }

    #[test]
    fn test_prune_keeps_newest_files() {
        let dir = tempdir().unwrap();
        let mut logger = TelemetryLogger::new(config(dir.path(), 1, 2)).unwrap();

        for _ in 0..5 {
            logger.log(&record()).unwrap();
        }

        let files = telemetry_files(dir.path());
        assert_eq!(files.len(), 2);
        // Sequence numbers 0003 and 0004 survive.
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert!(names[0].contains("_0003"));
        assert!(names[1].contains("_0004"));
    }
}
