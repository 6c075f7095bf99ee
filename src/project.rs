/*!
 * Auxiliary resources attached to a document: video, timecodes and keyframes.
 *
 * Video files are only referenced, never decoded. Timecode and keyframe files
 * are parsed so that commands can convert between frames and times.
 */

use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header of the supported timecode format
const TIMECODES_V2_HEADER: &str = "# timecode format v2";

/// Header of the supported keyframe format
const KEYFRAMES_V1_HEADER: &str = "# keyframe format v1";

/// Kind of auxiliary resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Video,
    Timecodes,
    Keyframes,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Timecodes => "timecodes",
            Self::Keyframes => "keyframes",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised while attaching a resource
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Failed to load {kind} from {path:?}: {source}")]
    Io {
        kind: ResourceKind,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load {kind} from {path:?}: {reason}")]
    Format {
        kind: ResourceKind,
        path: PathBuf,
        reason: String,
    },
}

/// Mapping between frame numbers and times
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRate {
    /// Constant frames per second
    Constant(f64),
    /// Start time of every frame in ms, non-decreasing
    Variable(Vec<f64>),
}

impl FrameRate {
    /// Start time of `frame` in ms
    pub fn time_at_frame(&self, frame: usize) -> u64 {
        match self {
            Self::Constant(fps) => (frame as f64 * 1000.0 / fps).round() as u64,
            Self::Variable(times) => {
                let Some(&end) = times.last() else {
                    return 0;
                };
                if let Some(t) = times.get(frame) {
                    return t.round() as u64;
                }
                // Past the end: extend with the average frame duration
                let last = times.len() - 1;
                (end + average_duration(times) * (frame - last) as f64).round() as u64
            }
        }
    }

    /// Last frame starting at or before `ms`
    pub fn frame_at_time(&self, ms: u64) -> usize {
        match self {
            Self::Constant(fps) => {
                let estimate = frames_within(ms as f64 + 0.5, *fps / 1000.0);
                self.settle(estimate, 0, ms)
            }
            Self::Variable(times) => {
                let idx = times.partition_point(|t| t.round() as u64 <= ms);
                if idx < times.len() {
                    return idx.saturating_sub(1);
                }
                let last = times.len().saturating_sub(1);
                let average = average_duration(times);
                if average <= 0.0 {
                    return last;
                }
                let elapsed = ms as f64 + 0.5 - times[last];
                let estimate = last.saturating_add(frames_within(elapsed, 1.0 / average));
                self.settle(estimate, last, ms)
            }
        }
    }

    /// Correct a float estimate by the odd frame lost to rounding
    fn settle(&self, mut frame: usize, lowest: usize, ms: u64) -> usize {
        for _ in 0..2 {
            if frame > lowest && self.time_at_frame(frame) > ms {
                frame -= 1;
            }
        }
        for _ in 0..2 {
            match frame.checked_add(1) {
                Some(next) if self.time_at_frame(next) <= ms => frame = next,
                _ => break,
            }
        }
        frame
    }
}

/// Mean frame duration in ms; zero for fewer than two distinct times
fn average_duration(times: &[f64]) -> f64 {
    match (times.first(), times.last()) {
        (Some(first), Some(last)) if times.len() > 1 => (last - first) / (times.len() - 1) as f64,
        _ => 0.0,
    }
}

/// Whole frames strictly inside `span` ms at `per_ms` frames per ms, saturating
fn frames_within(span: f64, per_ms: f64) -> usize {
    let frames = (span * per_ms).ceil() - 1.0;
    if frames.is_nan() || frames <= 0.0 { 0 } else { frames as usize }
}

/// Parsed keyframe list
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    /// Keyframe frame numbers, ascending
    pub frames: Vec<usize>,
    /// Frame rate named in the file; zero when unknown
    pub fps: f64,
}

/// Resources attached for one run
#[derive(Debug, Default)]
pub struct Project {
    video: Option<PathBuf>,
    timecodes: Option<FrameRate>,
    keyframes: Option<Keyframes>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a video. Only its existence is checked.
    pub fn load_video(&mut self, path: &Path) -> Result<(), ResourceError> {
        fs::metadata(path).map_err(|source| ResourceError::Io {
            kind: ResourceKind::Video,
            path: path.to_path_buf(),
            source,
        })?;
        info!("Attached video {:?}", path);
        self.video = Some(path.to_path_buf());
        Ok(())
    }

    pub fn load_timecodes(&mut self, path: &Path) -> Result<(), ResourceError> {
        let content = read_resource(ResourceKind::Timecodes, path)?;
        let rate = parse_timecodes(&content).map_err(|reason| ResourceError::Format {
            kind: ResourceKind::Timecodes,
            path: path.to_path_buf(),
            reason,
        })?;
        if let FrameRate::Variable(times) = &rate {
            debug!("Loaded {} timecodes from {:?}", times.len(), path);
        }
        self.timecodes = Some(rate);
        Ok(())
    }

    pub fn load_keyframes(&mut self, path: &Path) -> Result<(), ResourceError> {
        let content = read_resource(ResourceKind::Keyframes, path)?;
        let keyframes = parse_keyframes(&content).map_err(|reason| ResourceError::Format {
            kind: ResourceKind::Keyframes,
            path: path.to_path_buf(),
            reason,
        })?;
        debug!("Loaded {} keyframes from {:?}", keyframes.frames.len(), path);
        self.keyframes = Some(keyframes);
        Ok(())
    }

    pub fn video(&self) -> Option<&Path> {
        self.video.as_deref()
    }

    pub fn timecodes(&self) -> Option<&FrameRate> {
        self.timecodes.as_ref()
    }

    pub fn keyframes(&self) -> Option<&Keyframes> {
        self.keyframes.as_ref()
    }

    /// Timecodes if loaded, else the constant rate from the keyframe file
    pub fn frame_rate(&self) -> Option<FrameRate> {
        if let Some(rate) = &self.timecodes {
            return Some(rate.clone());
        }
        self.keyframes
            .as_ref()
            .filter(|k| k.fps > 0.0)
            .map(|k| FrameRate::Constant(k.fps))
    }
}

fn read_resource(kind: ResourceKind, path: &Path) -> Result<String, ResourceError> {
    fs::read_to_string(path).map_err(|source| ResourceError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a v2 timecode file
pub fn parse_timecodes(content: &str) -> Result<FrameRate, String> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    match lines.next() {
        Some(header) if header.eq_ignore_ascii_case(TIMECODES_V2_HEADER) => {}
        Some(header) => return Err(format!("unsupported timecode format: {}", header)),
        None => return Err("file is empty".to_string()),
    }

    let mut times: Vec<f64> = Vec::new();
    for line in lines.filter(|l| !l.starts_with('#')) {
        let time: f64 = line
            .parse()
            .ok()
            .filter(|t: &f64| t.is_finite())
            .ok_or_else(|| format!("invalid timecode: {}", line))?;
        if let Some(&previous) = times.last() {
            if time < previous {
                return Err(format!("timecodes are not sorted at {}", line));
            }
        }
        times.push(time);
    }

    if times.is_empty() {
        return Err("no timecodes found".to_string());
    }
    Ok(FrameRate::Variable(times))
}

/// Parse a v1 keyframe file
pub fn parse_keyframes(content: &str) -> Result<Keyframes, String> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    match lines.next() {
        Some(header) if header.eq_ignore_ascii_case(KEYFRAMES_V1_HEADER) => {}
        Some(header) => return Err(format!("unsupported keyframe format: {}", header)),
        None => return Err("file is empty".to_string()),
    }

    let mut fps = 0.0;
    let mut frames = Vec::new();
    for line in lines.filter(|l| !l.starts_with('#')) {
        if let Some(rate) = line.strip_prefix("fps") {
            // Zero means the rate is unknown
            fps = rate
                .trim()
                .parse()
                .ok()
                .filter(|r: &f64| r.is_finite() && *r >= 0.0)
                .ok_or_else(|| format!("invalid frame rate: {}", line))?;
            continue;
        }
        let frame: usize = line
            .parse()
            .map_err(|_| format!("invalid keyframe: {}", line))?;
        frames.push(frame);
    }

    frames.sort_unstable();
    frames.dedup();
    Ok(Keyframes { frames, fps })
}
