use crate::util::{create_with_backoff, open_with_backoff};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Minimal NDJSON reader with buffering and empty-line trimming.
/// Uses robust open-with-backoff for Windows-friendliness.
pub struct NdjsonReader {
    rdr: BufReader<File>,
}

impl NdjsonReader {
    pub fn open(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = open_with_backoff(path, 16, 50)?;
        Ok(Self { rdr: BufReader::with_capacity(buf_bytes.max(8 * 1024), f) })
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    /// Strips trailing `\r?\n`.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 { return Ok(0); }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        Ok(n)
    }

    /// Next non-blank line, or `None` at EOF.
    pub fn next_record_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        loop {
            if self.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            if !buf.trim().is_empty() {
                return Ok(Some(std::mem::take(&mut buf)));
            }
        }
    }
}

/// Minimal NDJSON writer with buffering and robust file creation.
pub struct NdjsonWriter {
    w: BufWriter<File>,
}

impl NdjsonWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = create_with_backoff(path, 16, 50)?;
        Ok(Self { w: BufWriter::with_capacity(buf_bytes.max(8 * 1024), f) })
    }

    #[inline]
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        self.w.write_all(s.as_bytes())?;
        self.w.write_all(b"\n")
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.w.flush()
    }
}
