/*!
 * Active line and selection over a loaded document.
 *
 * The selection is resolved once from the `--active-line` index and the
 * `--selected-lines` range, and afterwards only changed by macros.
 */

use std::collections::BTreeSet;
use log::debug;
use thiserror::Error;

use crate::document::{LineId, SubtitleDocument};
use crate::errors::ArgumentError;

/// Positions parsed from a range expression; empty means "every line"
pub type LineIndexSet = BTreeSet<usize>;

/// Errors raised while establishing a selection
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// There is no line to make active
    #[error("cannot select lines in an empty document")]
    EmptyDocument,

    /// A line id does not belong to the document
    #[error("line {0} is not part of the document")]
    UnknownLine(LineId),
}

/// Exactly one active line plus a non-empty set of selected lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    active: LineId,
    selected: BTreeSet<LineId>,
}

impl Selection {
    /// Build a selection after checking every id against the document
    pub fn new(
        document: &SubtitleDocument,
        active: LineId,
        selected: BTreeSet<LineId>,
    ) -> Result<Self, SelectionError> {
        if let Some(unknown) = std::iter::once(&active)
            .chain(selected.iter())
            .find(|id| !document.contains(**id))
        {
            return Err(SelectionError::UnknownLine(*unknown));
        }
        let mut selected = selected;
        if selected.is_empty() {
            selected.insert(active);
        }
        Ok(Self { active, selected })
    }

    pub fn active(&self) -> LineId {
        self.active
    }

    pub fn selected(&self) -> &BTreeSet<LineId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected positions in document order
    pub fn positions(&self, document: &SubtitleDocument) -> Vec<usize> {
        document
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| self.selected.contains(&line.id))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Parse a `--selected-lines` expression such as `0,2-4, 9`
pub fn parse_range(input: &str) -> Result<LineIndexSet, ArgumentError> {
    let mut indices = LineIndexSet::new();
    if input.trim().is_empty() {
        return Ok(indices);
    }

    let invalid = |reason: String| ArgumentError::InvalidRange {
        input: input.to_string(),
        reason,
    };

    for item in input.split(',').map(str::trim) {
        if item.is_empty() {
            return Err(invalid("empty item".to_string()));
        }
        match item.split_once('-') {
            Some((first, last)) => {
                let first: usize = first
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("\"{}\" is not a line index", first.trim())))?;
                let last: usize = last
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("\"{}\" is not a line index", last.trim())))?;
                if first > last {
                    return Err(invalid(format!("range {} is reversed", item)));
                }
                indices.extend(first..=last);
            }
            None => {
                let index: usize = item
                    .parse()
                    .map_err(|_| invalid(format!("\"{}\" is not a line index", item)))?;
                indices.insert(index);
            }
        }
    }
    Ok(indices)
}

/// Resolve the active line and selection in one pass over the document.
///
/// The line at `active_index` becomes active. Lines are selected when
/// `indices` is empty or contains their position; the first selected line is
/// the provisional active line until `active_index` is reached. With no active
/// line at all, the first line becomes both active and the only selected line.
pub fn resolve(
    document: &SubtitleDocument,
    active_index: i64,
    indices: &LineIndexSet,
) -> Result<Selection, SelectionError> {
    let mut active: Option<LineId> = None;
    let mut selected = BTreeSet::new();

    for (i, line) in document.lines().iter().enumerate() {
        if i as i64 == active_index {
            active = Some(line.id);
        }

        if indices.is_empty() || indices.contains(&i) {
            selected.insert(line.id);
            if active.is_none() {
                active = Some(line.id);
            }
        }
    }

    let active = match active {
        Some(id) => id,
        None => {
            let first = document.first().ok_or(SelectionError::EmptyDocument)?;
            debug!("Selection was empty, falling back to the first line");
            selected.insert(first.id);
            first.id
        }
    };

    if selected.is_empty() {
        selected.insert(active);
    }

    Ok(Selection { active, selected })
}
