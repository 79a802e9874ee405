//! Append-only log file writer.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Shared handle to the JSONL file. Each write is flushed so a line is never
/// split across a crash.
#[derive(Clone)]
pub struct LogFileWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    /// Open `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// [`MakeWriter`] handing out clones of one [`LogFileWriter`].
#[derive(Clone)]
pub struct LogWriterFactory {
    writer: LogFileWriter,
}

impl LogWriterFactory {
    pub fn new(writer: LogFileWriter) -> Self {
        Self { writer }
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_parent_dirs_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("run.jsonl");

        let mut first = LogFileWriter::open(&path).unwrap();
        first.write_all(b"one\n").unwrap();
        let mut second = LogFileWriter::open(&path).unwrap();
        second.write_all(b"two\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn factory_clones_share_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let factory = LogWriterFactory::new(LogFileWriter::open(&path).unwrap());

        factory.make_writer().write_all(b"a\n").unwrap();
        factory.make_writer().write_all(b"b\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
