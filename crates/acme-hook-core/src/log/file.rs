// # Domain Log
//
// File-backed implementation of LogSink.
//
// ## Format
//
// One line per message, appended to `<log_dir>/certbot-<base_domain>.log`:
//
// ```text
// 2026-10-18 14:02:11.532914 ::: === New validation request (type: auth) ===
// ```
//
// In debug mode nothing is written to the file. Every line, including
// debug-only response dumps, goes to stdout prefixed with `[DEBUG]`.
//
// ## Lifetime
//
// The file is opened when the orchestrator is constructed and flushed when
// the `DomainLog` is dropped, on success and on every error path.

use std::fs::{self, File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::traits::LogSink;
use crate::Result;

/// Per-domain validation log
#[derive(Debug)]
pub struct DomainLog {
    target: Target,
}

#[derive(Debug)]
enum Target {
    File {
        path: PathBuf,
        writer: Mutex<LineWriter<File>>,
    },
    Console,
}

impl DomainLog {
    /// File name used for a base domain
    pub fn file_name(base_domain: &str) -> String {
        format!("certbot-{}.log", base_domain)
    }

    /// Open the log for a base domain
    ///
    /// With `debug` set, the log writes to the console instead and no file
    /// is created.
    pub fn open(log_dir: &Path, base_domain: &str, debug: bool) -> Result<Self> {
        if debug {
            return Ok(Self::console());
        }
        Self::open_file(log_dir.join(Self::file_name(base_domain)))
    }

    /// Open (or create) a log file in append mode
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!("Opened validation log: {}", path.display());

        Ok(Self {
            target: Target::File {
                path,
                writer: Mutex::new(LineWriter::new(file)),
            },
        })
    }

    /// A log that prints every line to stdout
    pub fn console() -> Self {
        Self {
            target: Target::Console,
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File { path, .. } => Some(path),
            Target::Console => None,
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

impl LogSink for DomainLog {
    fn write(&self, message: &str, debug_only: bool) {
        match &self.target {
            Target::File { path, writer } => {
                if debug_only {
                    return;
                }
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writeln!(writer, "{} ::: {}", timestamp(), message) {
                    tracing::warn!("Failed to write to {}: {}", path.display(), e);
                }
            }
            Target::Console => {
                println!("[DEBUG] {} ::: {}", timestamp(), message);
            }
        }
    }

    fn flush(&self) {
        if let Target::File { path, writer } = &self.target {
            let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for DomainLog {
    fn drop(&mut self) {
        self.flush();
    }
}
