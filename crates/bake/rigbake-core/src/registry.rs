//! Clip registry: contiguous frame-index ranges into the combined buffer, plus
//! the transition adjacency map derived from transition clip names.
//!
//! Records are assigned in creation order (rest pose, main clips, transitions),
//! each starting one past the previous record's end, so the ranges partition the
//! buffer with no gaps.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::transition::TRANSITION_SEPARATOR;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Rest,
    Main,
    Transition,
}

/// One clip's slot in the combined buffer. Indices are buffer frame positions,
/// not scene frame numbers; `[start_index, end_index]` is inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    pub name: String,
    pub kind: ClipKind,
    pub start_index: usize,
    pub end_index: usize,
    pub frame_step: u32,
    /// Scene frames the clip was sampled from (`(1, 10)` for transitions).
    pub source_range: (u32, u32),
}

impl ClipRecord {
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.end_index + 1 - self.start_index
    }

    #[inline]
    pub fn is_transition(&self) -> bool {
        self.kind == ClipKind::Transition
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClipRegistry {
    records: Vec<ClipRecord>,
    total_frames: usize,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clip of `frame_count` frames (must be > 0) right after the last one.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        kind: ClipKind,
        frame_count: usize,
        frame_step: u32,
        source_range: (u32, u32),
    ) -> &ClipRecord {
        debug_assert!(frame_count > 0, "clip records cover at least one frame");
        let start_index = self.total_frames;
        let end_index = start_index + frame_count - 1;
        self.total_frames += frame_count;
        self.records.push(ClipRecord {
            name: name.into(),
            kind,
            start_index,
            end_index,
            frame_step,
            source_range,
        });
        &self.records[self.records.len() - 1]
    }

    #[inline]
    pub fn records(&self) -> &[ClipRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ClipRecord> {
        self.records
    }

    #[inline]
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ClipRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn build_adjacency(&self, unit_name: &str) -> Adjacency {
        build_adjacency(&self.records, unit_name)
    }
}

/// `source -> { destination -> transition clip name }`, insertion ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    pub map: IndexMap<String, IndexMap<String, String>>,
    /// Transition names that could not be resolved to two main clips.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl Adjacency {
    pub fn get(&self, source: &str, destination: &str) -> Option<&str> {
        self.map
            .get(source)
            .and_then(|dsts| dsts.get(destination))
            .map(String::as_str)
    }

    pub fn outgoing(&self, source: &str) -> Option<&IndexMap<String, String>> {
        self.map.get(source)
    }

    pub fn pair_count(&self) -> usize {
        self.map.values().map(IndexMap::len).sum()
    }
}

/// Split a transition clip name into `(source, destination)`.
///
/// A leading `"{unit}_"` is stripped first. Names that do not split into
/// exactly two parts on the separator yield `None`.
pub fn split_transition_name<'a>(name: &'a str, unit_name: &str) -> Option<(&'a str, &'a str)> {
    let prefix = format!("{unit_name}_");
    let stem = if unit_name.is_empty() {
        name
    } else {
        name.strip_prefix(prefix.as_str()).unwrap_or(name)
    };
    split_stem(stem)
}

fn split_stem(stem: &str) -> Option<(&str, &str)> {
    let mut parts = stem.split(TRANSITION_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(src), Some(dst), None) => Some((src, dst)),
        _ => None,
    }
}

/// Resolve a transition name against the main clips of the same export.
///
/// The unit-stripped split is tried first, then the full name, so clips whose
/// own names start with `"{unit}_"` still resolve. Both halves must name a main
/// clip; with no main records at all any two-part split is accepted.
fn resolve_transition<'a>(
    name: &'a str,
    unit_name: &str,
    mains: &IndexSet<&str>,
) -> Option<(&'a str, &'a str)> {
    let accepts = |(src, dst): (&str, &str)| {
        mains.is_empty() || (mains.contains(src) && mains.contains(dst))
    };
    split_transition_name(name, unit_name)
        .filter(|pair| accepts(*pair))
        .or_else(|| split_stem(name).filter(|pair| accepts(*pair)))
}

/// Build the adjacency map from the transition records. Names that do not
/// resolve to two main clips stay in the record list but are left out of the
/// map, with a warning.
pub fn build_adjacency(records: &[ClipRecord], unit_name: &str) -> Adjacency {
    let mains: IndexSet<&str> = records
        .iter()
        .filter(|r| r.kind == ClipKind::Main)
        .map(|r| r.name.as_str())
        .collect();
    let mut adjacency = Adjacency::default();
    for record in records.iter().filter(|r| r.is_transition()) {
        match resolve_transition(&record.name, unit_name, &mains) {
            Some((src, dst)) => {
                adjacency
                    .map
                    .entry(src.to_string())
                    .or_default()
                    .insert(dst.to_string(), record.name.clone());
            }
            None => {
                warn!(
                    transition = %record.name,
                    "transition name does not resolve to a source and destination clip; left out of adjacency map"
                );
                adjacency.skipped.push(record.name.clone());
            }
        }
    }
    adjacency
}
