//! Script sinks.
//!
//! - [`FileSink`]: writes a file atomically (temp file, then rename)
//! - [`StdoutSink`]: writes to standard output
//! - [`MemorySink`]: keeps lines in memory

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::traits::ScriptSink;
use crate::error::Result;

/// Writes the script to a file.
///
/// Lines go to a temporary file in the destination directory, which is
/// renamed over the destination only after every line was written and
/// flushed. A failed export leaves any existing file untouched and no
/// partial script behind.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScriptSink for FileSink {
    fn write_script(&mut self, lines: &[String]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write_lines(&mut writer, lines)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Wrote {} lines to {:?}", lines.len(), self.path);
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes the script to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ScriptSink for StdoutSink {
    fn write_script(&mut self, lines: &[String]) -> Result<()> {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        write_lines(&mut writer, lines)?;
        writer.flush()?;
        Ok(())
    }

    fn location(&self) -> String {
        "stdout".to_string()
    }
}

/// Collects script lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected script as one newline-terminated string.
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl ScriptSink for MemorySink {
    fn write_script(&mut self, lines: &[String]) -> Result<()> {
        self.lines.extend_from_slice(lines);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        vec!["-- header".to_string(), String::new(), "SELECT 1;".to_string()]
    }

    #[test]
    fn test_file_sink_writes_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql");
        let mut sink = FileSink::new(&path);
        sink.write_script(&lines()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "-- header\n\nSELECT 1;\n");
        assert_eq!(sink.location(), path.display().to_string());
    }

    #[test]
    fn test_file_sink_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql");
        fs::write(&path, "old contents\n").unwrap();

        FileSink::new(&path).write_script(&lines()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "-- header\n\nSELECT 1;\n");
    }

    #[test]
    fn test_file_sink_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.sql");
        FileSink::new(&path).write_script(&lines()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_sink_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql");
        FileSink::new(&path).write_script(&lines()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_memory_sink_contents() {
        let mut sink = MemorySink::new();
        sink.write_script(&lines()).unwrap();
        assert_eq!(sink.lines.len(), 3);
        assert_eq!(sink.contents(), "-- header\n\nSELECT 1;\n");
    }
}
