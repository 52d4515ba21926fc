use crate::db::DB;
use std::{
    sync::Weak,
    thread,
    time::{Duration, Instant},
};
use tempfile::TempDir;

const DB_RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// Keeps a temporary DB directory alive for as long as the DB is referenced.
/// On drop, waits (bounded) for the last DB reference to be released before
/// removing the directory.
pub struct DbLifetime {
    weak_db_ref: Weak<DB>,
    tempdir: Option<TempDir>,
}

impl DbLifetime {
    pub fn new(tempdir: TempDir, weak_db_ref: Weak<DB>) -> Self {
        Self { weak_db_ref, tempdir: Some(tempdir) }
    }
}

impl Drop for DbLifetime {
    fn drop(&mut self) {
        let start = Instant::now();
        while self.weak_db_ref.strong_count() > 0 && start.elapsed() < DB_RELEASE_TIMEOUT {
            thread::sleep(Duration::from_millis(10));
        }
        // Directory removal failure only leaks a temp folder
        if let Some(tempdir) = self.tempdir.take() {
            let _ = tempdir.close();
        }
    }
}

pub fn get_temp_dir() -> TempDir {
    let global_tempdir = std::env::temp_dir();
    let graph_tempdir = global_tempdir.join("kgi-rust");
    // A failure here surfaces from `tempdir_in` below
    let _ = std::fs::create_dir_all(graph_tempdir.as_path());
    match tempfile::tempdir_in(graph_tempdir.as_path()) {
        Ok(dir) => dir,
        Err(err) => panic!("could not create a temp dir under {}: {err}", graph_tempdir.display()),
    }
}

/// Creates a DB within a temp directory under `<OS SPECIFIC TEMP DIR>/kgi-rust`
/// Callers must keep the returned `DbLifetime` guard for as long as they wish the DB to exist.
///
/// Intended for tests. Panics if the DB cannot be opened.
#[macro_export]
macro_rules! create_temp_db {
    ($conn_builder: expr) => {{
        let db_tempdir = $crate::utils::get_temp_dir();
        let db_path = db_tempdir.path().to_owned();
        let db = match $conn_builder.with_db_path(db_path).build() {
            Ok(db) => db,
            Err(err) => panic!("failed to open temp db: {err}"),
        };
        ($crate::utils::DbLifetime::new(db_tempdir, std::sync::Arc::downgrade(&db)), db)
    }};
}
