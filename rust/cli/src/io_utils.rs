//! File I/O helpers shared by the commands.
//!
//! Hand histories are JSONL. A path ending in `.zst` is Zstandard
//! compressed on write and decompressed on read.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

/// Reads one trimmed line; `None` on EOF or a read error.
///
/// ```rust
/// use std::io::Cursor;
/// # use kalooki_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new("  draw deck \n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("draw deck"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

/// Reads a text file, decompressing `.zst` files. A UTF-8 BOM is stripped.
pub fn read_text_auto(path: &str) -> Result<String, String> {
    let mut content = if path.ends_with(".zst") {
        let comp = std::fs::read(path).map_err(|e| e.to_string())?;
        let dec = zstd::stream::decode_all(comp.as_slice()).map_err(|e| e.to_string())?;
        String::from_utf8(dec).map_err(|e| e.to_string())?
    } else {
        std::fs::read_to_string(path).map_err(|e| e.to_string())?
    };
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Creates the parent directory of `path` when it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

/// Destination for hand-history lines. Call [`HistoryWriter::finish`] so a
/// compressed file gets its closing frame.
pub enum HistoryWriter {
    Plain(BufWriter<File>),
    Zstd(zstd::stream::write::Encoder<'static, BufWriter<File>>),
}

impl HistoryWriter {
    /// Truncates or creates `path`.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        ensure_parent_dir(path).map_err(std::io::Error::other)?;
        let file = BufWriter::new(File::create(path)?);
        if path.extension().is_some_and(|e| e == "zst") {
            Ok(HistoryWriter::Zstd(zstd::stream::write::Encoder::new(file, 0)?))
        } else {
            Ok(HistoryWriter::Plain(file))
        }
    }

    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.write_all(line.as_bytes())?;
        self.write_all(b"\n")
    }

    pub fn finish(self) -> std::io::Result<()> {
        match self {
            HistoryWriter::Plain(mut w) => w.flush(),
            HistoryWriter::Zstd(enc) => enc.finish()?.flush(),
        }
    }
}

impl Write for HistoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            HistoryWriter::Plain(w) => w.write(buf),
            HistoryWriter::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            HistoryWriter::Plain(w) => w.flush(),
            HistoryWriter::Zstd(w) => w.flush(),
        }
    }
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
