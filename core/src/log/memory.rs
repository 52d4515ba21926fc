use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// A log sink which keeps records in memory. Used for injecting into components under test.
pub struct MemoryLog {
    level: LevelFilter,
    records: Mutex<Vec<CapturedRecord>>,
}

impl MemoryLog {
    pub fn new(level: LevelFilter) -> Self {
        Self { level, records: Mutex::new(Vec::new()) }
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records.lock().iter().any(|r| r.level == level && r.message.contains(needle))
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new(LevelFilter::Trace)
    }
}

impl Log for MemoryLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.records.lock().push(CapturedRecord {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}
