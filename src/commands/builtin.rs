use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::collections::BTreeSet;

use crate::document::{LineId, SubtitleDocument};
use crate::file_utils::FileManager;
use crate::session::Session;

use super::{Command, CommandRegistry};

// @module: Built-in commands

/// Length of the blank line inserted when a document would become empty
const DEFAULT_LINE_DURATION_MS: u64 = 5000;

/// Register every built-in command
pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(Box::new(DeleteLines));
    registry.register(Box::new(DuplicateLines));
    registry.register(Box::new(JoinConcatenate));
    registry.register(Box::new(SortByStartTime));
    registry.register(Box::new(SnapToScene));
    registry.register(Box::new(SaveSelection));
}

fn has_selection(session: &Session) -> bool {
    !session.selection().is_empty()
}

/// Ids of the selected lines in document order
fn selected_ids(session: &Session) -> Vec<LineId> {
    session.selected_lines().iter().map(|line| line.id).collect()
}

// @command: edit/line/delete
pub struct DeleteLines;

impl Command for DeleteLines {
    fn name(&self) -> &str {
        "edit/line/delete"
    }

    fn display_name(&self, _session: &Session) -> String {
        "Delete Lines".to_string()
    }

    fn help(&self) -> &str {
        "Delete currently selected lines"
    }

    fn validate(&self, session: &Session) -> bool {
        has_selection(session)
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        let positions = session.selection().positions(session.document());
        let first = *positions.first().ok_or_else(|| anyhow!("no lines selected"))?;
        let selected = session.selection().selected().clone();

        let removed = session.document_mut().remove_where(|id| selected.contains(&id));
        debug!("Deleted {} lines", removed);

        let document = session.document_mut();
        if document.is_empty() {
            // A document always keeps at least one line
            document.push(0, DEFAULT_LINE_DURATION_MS, String::new());
        }
        let next = document.lines()[first.min(document.len() - 1)].id;

        session.set_selection_and_active(BTreeSet::from([next]), next)?;
        Ok(())
    }
}

// @command: edit/line/duplicate
pub struct DuplicateLines;

impl Command for DuplicateLines {
    fn name(&self) -> &str {
        "edit/line/duplicate"
    }

    fn display_name(&self, _session: &Session) -> String {
        "Duplicate Lines".to_string()
    }

    fn help(&self) -> &str {
        "Duplicate the selected lines after the last selected line"
    }

    fn validate(&self, session: &Session) -> bool {
        has_selection(session)
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        let positions = session.selection().positions(session.document());
        let last = *positions.last().ok_or_else(|| anyhow!("no lines selected"))?;
        let active = session.selection().active();

        let originals: Vec<_> = positions
            .iter()
            .map(|&p| session.document().lines()[p].clone())
            .collect();

        let mut copies = BTreeSet::new();
        let mut new_active = None;
        let document = session.document_mut();
        for (offset, line) in originals.iter().enumerate() {
            let id = document.insert(last + 1 + offset, line.start_ms, line.end_ms, line.text.clone());
            if line.id == active {
                new_active = Some(id);
            }
            copies.insert(id);
        }

        let new_active = match new_active {
            Some(id) => id,
            None => *copies.iter().next().ok_or_else(|| anyhow!("nothing was duplicated"))?,
        };
        session.set_selection_and_active(copies, new_active)?;
        Ok(())
    }
}

// @command: edit/line/join/concatenate
pub struct JoinConcatenate;

impl Command for JoinConcatenate {
    fn name(&self) -> &str {
        "edit/line/join/concatenate"
    }

    fn display_name(&self, _session: &Session) -> String {
        "Concatenate".to_string()
    }

    fn help(&self) -> &str {
        "Join selected lines in a single one, concatenating text together"
    }

    fn validate(&self, session: &Session) -> bool {
        session.selection().len() >= 2
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        let ids = selected_ids(session);
        let (&keep, rest) = ids.split_first().ok_or_else(|| anyhow!("no lines selected"))?;

        let lines = session.selected_lines();
        let start = lines.iter().map(|l| l.start_ms).min().unwrap_or(0);
        let end = lines.iter().map(|l| l.end_ms).max().unwrap_or(start);
        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let document = session.document_mut();
        let target = document
            .get_mut(keep)
            .ok_or_else(|| anyhow!("line {} disappeared", keep))?;
        target.start_ms = start;
        target.end_ms = end;
        target.text = text;

        let rest: BTreeSet<LineId> = rest.iter().copied().collect();
        document.remove_where(|id| rest.contains(&id));

        session.set_selection_and_active(BTreeSet::from([keep]), keep)?;
        Ok(())
    }
}

// @command: grid/sort/start
pub struct SortByStartTime;

impl Command for SortByStartTime {
    fn name(&self) -> &str {
        "grid/sort/start"
    }

    fn display_name(&self, _session: &Session) -> String {
        "Start Time".to_string()
    }

    fn help(&self) -> &str {
        "Sort all subtitles by their start times"
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        session.document_mut().sort_by_start();
        Ok(())
    }
}

// @command: time/snap/scene
pub struct SnapToScene;

impl Command for SnapToScene {
    fn name(&self) -> &str {
        "time/snap/scene"
    }

    fn display_name(&self, _session: &Session) -> String {
        "Snap to Scene".to_string()
    }

    fn help(&self) -> &str {
        "Set start and end of subtitles to the keyframes around the current selection"
    }

    fn validate(&self, session: &Session) -> bool {
        let project = session.project();
        has_selection(session)
            && project.frame_rate().is_some()
            && project.keyframes().is_some_and(|k| !k.frames.is_empty())
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        let project = session.project();
        let rate = project.frame_rate().context("no frame rate is available")?;
        let keyframes = project
            .keyframes()
            .map(|k| k.frames.clone())
            .context("no keyframes are loaded")?;

        let lines = session.selected_lines();
        let start_ms = lines.iter().map(|l| l.start_ms).min().context("no lines selected")?;
        let end_ms = lines.iter().map(|l| l.end_ms).max().unwrap_or(start_ms);

        let start_frame = rate.frame_at_time(start_ms);
        let end_frame = rate.frame_at_time(end_ms);

        // Keyframe at or before the start, and the first keyframe after the end
        let before = keyframes.partition_point(|&k| k <= start_frame);
        let scene_start = if before == 0 { 0 } else { keyframes[before - 1] };
        let after = keyframes.partition_point(|&k| k <= end_frame);
        let new_start = rate.time_at_frame(scene_start);
        let new_end = match keyframes.get(after) {
            Some(&next) => rate.time_at_frame(next),
            None => end_ms,
        };
        debug!("Snapping selection to frames {}..{:?}", scene_start, keyframes.get(after));

        let ids = selected_ids(session);
        let document = session.document_mut();
        for id in ids {
            if let Some(line) = document.get_mut(id) {
                line.start_ms = new_start;
                line.end_ms = new_end.max(new_start);
            }
        }
        Ok(())
    }
}

// @command: subtitle/save/selection
pub struct SaveSelection;

impl Command for SaveSelection {
    fn name(&self) -> &str {
        "subtitle/save/selection"
    }

    fn display_name(&self, _session: &Session) -> String {
        "Export Selected Lines...".to_string()
    }

    fn help(&self) -> &str {
        "Save the selected lines to a separate file"
    }

    fn validate(&self, session: &Session) -> bool {
        has_selection(session)
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        let Some(paths) = session.dialogs_mut().pick_file("Export selected lines") else {
            info!("Export cancelled");
            return Ok(());
        };
        let path = paths.first().context("file picker returned no path")?;

        let content = SubtitleDocument::render_srt(session.selected_lines().into_iter());
        FileManager::write_to_file(path, &content)
            .with_context(|| format!("Failed to write selection to {:?}", path))?;
        info!("Exported {} lines to {:?}", session.selection().len(), path);
        Ok(())
    }
}
