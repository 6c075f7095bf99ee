use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};
use thiserror::Error;

use crate::file_utils::FileManager;

// @module: Subtitle document model and SubRip persistence

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp pattern is valid")
});

/// Errors raised while loading a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The file contains no subtitle lines
    #[error("no subtitle lines found")]
    Empty,
}

/// Stable identity of a line, assigned when the line enters the document.
///
/// Positions shift when lines are inserted or removed; ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// @struct: Single subtitle line
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleLine {
    // @field: Stable id
    pub id: LineId,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Line text, lines separated by '\n'
    pub text: String,
}

impl SubtitleLine {
    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Shift both ends of the line, clamping at zero
    pub fn shift(&mut self, offset_ms: i64) {
        self.start_ms = self.start_ms.saturating_add_signed(offset_ms);
        self.end_ms = self.end_ms.saturating_add_signed(offset_ms);
    }
}

/// An ordered sequence of subtitle lines loaded from one file
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    /// File the document was loaded from
    pub source_file: PathBuf,

    lines: Vec<SubtitleLine>,
    next_id: u64,
}

impl SubtitleDocument {
    /// Create an empty document; used by tests and by callers building one by hand
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleDocument {
            source_file,
            lines: Vec::new(),
            next_id: 0,
        }
    }

    /// Load a SubRip file. Empty documents are rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let document = Self::parse_srt(&content, path.to_path_buf())?;
        debug!("Loaded {} lines from {:?}", document.len(), path);
        Ok(document)
    }

    /// Parse SubRip content, keeping lines in file order
    pub fn parse_srt(content: &str, source_file: PathBuf) -> Result<Self, DocumentError> {
        let mut document = Self::new(source_file);

        let mut timing: Option<(u64, u64)> = None;
        let mut awaiting_timing = false;
        let mut text = String::new();

        // Strip a UTF-8 BOM some editors leave at the start
        let content = content.trim_start_matches('\u{feff}');

        for (line_no, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                if let Some((start, end)) = timing.take() {
                    document.push(start, end, std::mem::take(&mut text));
                }
                awaiting_timing = false;
                continue;
            }

            if timing.is_none() {
                if !awaiting_timing && trimmed.parse::<usize>().is_ok() {
                    awaiting_timing = true;
                    continue;
                }
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    timing = Some((Self::capture_ms(&caps, 1), Self::capture_ms(&caps, 5)));
                    awaiting_timing = false;
                    continue;
                }
                warn!("Unexpected text at line {} before a timestamp: {}", line_no + 1, trimmed);
                continue;
            }

            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(trimmed);
        }

        if let Some((start, end)) = timing {
            document.push(start, end, text);
        }

        if document.is_empty() {
            return Err(DocumentError::Empty);
        }

        let overlaps = document
            .lines
            .windows(2)
            .filter(|pair| pair[0].end_ms > pair[1].start_ms)
            .count();
        if overlaps > 0 {
            debug!("Found {} overlapping subtitle lines", overlaps);
        }

        Ok(document)
    }

    fn capture_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let part = |i: usize| -> u64 {
            caps.get(start_idx + i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        (part(0) * 3600 + part(1) * 60 + part(2)) * 1000 + part(3)
    }

    /// Render the document as SubRip text, numbering lines from 1
    pub fn to_srt_string(&self) -> String {
        Self::render_srt(self.lines.iter())
    }

    /// Render an arbitrary run of lines as SubRip text
    pub fn render_srt<'a>(lines: impl Iterator<Item = &'a SubtitleLine>) -> String {
        let mut out = String::new();
        for (i, line) in lines.enumerate() {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                SubtitleLine::format_timestamp(line.start_ms),
                SubtitleLine::format_timestamp(line.end_ms),
                line.text
            ));
        }
        out
    }

    /// Write the document to a SubRip file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        FileManager::write_to_file(path, &self.to_srt_string())
    }

    pub fn lines(&self) -> &[SubtitleLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn first(&self) -> Option<&SubtitleLine> {
        self.lines.first()
    }

    /// Current position of a line
    pub fn position(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    pub fn get(&self, id: LineId) -> Option<&SubtitleLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn get_mut(&mut self, id: LineId) -> Option<&mut SubtitleLine> {
        self.lines.iter_mut().find(|line| line.id == id)
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.get(id).is_some()
    }

    fn allocate_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a line, returning its id
    pub fn push(&mut self, start_ms: u64, end_ms: u64, text: String) -> LineId {
        let id = self.allocate_id();
        self.lines.push(SubtitleLine { id, start_ms, end_ms, text });
        id
    }

    /// Insert a copy of the given line data at `position`, returning the new id
    pub fn insert(&mut self, position: usize, start_ms: u64, end_ms: u64, text: String) -> LineId {
        let id = self.allocate_id();
        let position = position.min(self.lines.len());
        self.lines.insert(position, SubtitleLine { id, start_ms, end_ms, text });
        id
    }

    /// Remove every line whose id satisfies `remove`, returning how many were removed
    pub fn remove_where<F: Fn(LineId) -> bool>(&mut self, remove: F) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| !remove(line.id));
        before - self.lines.len()
    }

    /// Stable sort by start time
    pub fn sort_by_start(&mut self) {
        self.lines.sort_by_key(|line| line.start_ms);
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Document")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Lines: {}", self.lines.len())?;
        Ok(())
    }
}
