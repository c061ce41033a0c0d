use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::atom::{MemoryAtom, StoredAtom};
use crate::config::{StoreConfig, SyncMode};
use crate::error::StoreError;
use crate::store::AtomStore;

/// What a full pass over the log found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LogSummary {
    records: u64,
    skipped: u64,
    last_seq: u64,
    /// The file does not end in `\n`.
    torn_tail: bool,
}

/// Byte sink under the log. `File` in production.
trait LogSink: Send {
    fn append_bytes(&mut self, buf: &[u8]) -> std::io::Result<()>;
    fn flush_buffers(&mut self) -> std::io::Result<()>;
    fn sync(&mut self) -> std::io::Result<()>;
    fn size(&self) -> std::io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

impl LogSink for File {
    fn append_bytes(&mut self, buf: &[u8]) -> std::io::Result<()> {
        IoWrite::write_all(self, buf)
    }

    fn flush_buffers(&mut self) -> std::io::Result<()> {
        IoWrite::flush(self)
    }

    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_data()
    }

    fn size(&self) -> std::io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

struct LogWriter {
    sink: Box<dyn LogSink>,
    /// Next record must start on a fresh line.
    needs_newline: bool,
}

impl LogWriter {
    fn write_record(&mut self, buf: &[u8], mode: SyncMode) -> std::io::Result<()> {
        self.sink.append_bytes(buf)?;
        match mode {
            SyncMode::Immediate => self.sink.sync(),
            SyncMode::Flush => self.sink.flush_buffers(),
            SyncMode::OsManaged => Ok(()),
        }
    }

    /// Cut a failed record back off the log. True if the log is at `len`
    /// again and durably so.
    fn roll_back(&mut self, len: u64) -> bool {
        match self.sink.truncate_to(len).and_then(|()| self.sink.sync()) {
            Ok(()) => true,
            Err(e) => {
                warn!(len, error = %e, "atom log rollback failed");
                false
            }
        }
    }
}

/// Durable atom store: one JSON record per line.
///
/// The sequence counter is rebuilt from the log on open. Each append is a
/// single buffered write under the writer lock, so concurrent readers see
/// either the whole record or none of it.
pub struct JsonlAtomStore {
    path: PathBuf,
    config: StoreConfig,
    writer: Mutex<LogWriter>,
    last_seq: AtomicU64,
}

impl JsonlAtomStore {
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(StoreError::Write)?;

        let summary = read_log(&path, &mut |_| {})?;
        info!(
            path = %path.display(),
            records = summary.records,
            skipped = summary.skipped,
            last_seq = summary.last_seq,
            "atom log opened"
        );

        Ok(Self {
            path,
            config,
            writer: Mutex::new(LogWriter {
                sink: Box::new(file),
                needs_newline: summary.torn_tail,
            }),
            last_seq: AtomicU64::new(summary.last_seq),
        })
    }

    #[cfg(test)]
    fn with_sink(path: PathBuf, config: StoreConfig, sink: Box<dyn LogSink>) -> Self {
        Self {
            path,
            config,
            writer: Mutex::new(LogWriter {
                sink,
                needs_newline: false,
            }),
            last_seq: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[async_trait]
impl AtomStore for JsonlAtomStore {
    async fn append(&self, atom: MemoryAtom) -> Result<StoredAtom, StoreError> {
        let mut writer = self.writer.lock().await;
        let seq = self.last_seq.load(Ordering::SeqCst) + 1;
        let stored = StoredAtom { seq, atom };
        let line = stored.to_line()?;

        let mut buf = Vec::with_capacity(line.len() + 1);
        if writer.needs_newline {
            buf.push(b'\n');
        }
        buf.extend_from_slice(&line);

        let start = writer.sink.size().map_err(StoreError::Write)?;
        if let Err(e) = writer.write_record(&buf, self.config.sync_mode) {
            if writer.roll_back(start) {
                warn!(seq, error = %e, "atom append failed, log rolled back");
            } else {
                // The record may be on disk: its seq is never handed out again.
                self.last_seq.store(seq, Ordering::SeqCst);
                writer.needs_newline = true;
                warn!(seq, error = %e, "atom append failed, seq retired");
            }
            return Err(StoreError::Write(e));
        }
        writer.needs_newline = false;
        self.last_seq.store(seq, Ordering::SeqCst);
        debug!(seq, atom_id = %stored.atom.atom_id, verdict = %stored.atom.verdict, "atom appended");
        Ok(stored)
    }

    async fn scan(
        &self,
        visit: &mut (dyn FnMut(StoredAtom) + Send),
    ) -> Result<(), StoreError> {
        read_log(&self.path, visit)?;
        Ok(())
    }

    fn latest_seq(&self) -> Option<u64> {
        match self.last_seq.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(seq),
        }
    }
}

/// Stream the log, handing every decodable record to `visit`.
fn read_log(path: &Path, visit: &mut dyn FnMut(StoredAtom)) -> Result<LogSummary, StoreError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LogSummary::default()),
        Err(e) => return Err(StoreError::Read(e)),
    };
    let mut reader = BufReader::new(file);
    let mut summary = LogSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0u64;

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(StoreError::Read)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        if buf.last() != Some(&b'\n') {
            summary.torn_tail = true;
            summary.skipped += 1;
            warn!(path = %path.display(), line = line_no, "skipping truncated trailing record");
            break;
        }
        let text = match std::str::from_utf8(&buf[..n - 1]) {
            Ok(t) => t.trim(),
            Err(e) => {
                summary.skipped += 1;
                warn!(path = %path.display(), line = line_no, error = %e, "skipping non-utf8 record");
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }
        match StoredAtom::from_line(text) {
            Ok(stored) => {
                summary.records += 1;
                summary.last_seq = summary.last_seq.max(stored.seq);
                visit(stored);
            }
            Err(e) => {
                summary.skipped += 1;
                warn!(path = %path.display(), line = line_no, error = %e, "skipping corrupt record");
            }
        }
    }
    Ok(summary)
}
