//! Block deduplication and proximity collapse.
//!
//! Reduces every classified marker to a sparse set of landmarks:
//!
//! 1. Passes claim their block first.
//! 2. Rivers take remaining blocks.
//! 3. Towns take what is left, the most populous town winning each block.
//! 4. Consecutive survivors closer than the minimum separation are collapsed,
//!    dropping the earlier one.
//!
//! Each pass takes the previous [`Selection`] by value and returns a new one,
//! so the claimed-block set is threaded explicitly from pass to pass.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::classify::{ClassifiedLandmark, ClassifiedMap};
use crate::sampler::DistanceMarker;
use crate::{LandmarkConfig, LandmarkEntry, LandmarkKind};

/// Final landmarks keyed by kilometre, in ascending order.
pub type FilteredResult = BTreeMap<u32, LandmarkEntry>;

/// Landmarks accepted so far and the blocks they claim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub accepted: FilteredResult,
    pub claimed_blocks: BTreeSet<u32>,
}

impl Selection {
    fn has_pair(&self, kind: LandmarkKind, name: &str) -> bool {
        self.accepted
            .values()
            .any(|e| e.kind == kind && e.name == name)
    }

    fn accept(mut self, entry: LandmarkEntry, block: u32) -> Self {
        self.claimed_blocks.insert(block);
        self.accepted.insert(entry.km, entry);
        self
    }
}

/// Classified markers of one kind with real names, in ascending km order.
fn named_of_kind<'a>(
    classified: &'a ClassifiedMap,
    markers: &'a [DistanceMarker],
    kind: LandmarkKind,
) -> impl Iterator<Item = &'a ClassifiedLandmark> + 'a {
    markers
        .iter()
        .filter_map(move |m| classified.get(&m.km))
        .filter(move |c| c.entry.kind == kind && !c.entry.is_placeholder())
}

/// Pass 1: every named pass in an unclaimed block.
pub fn select_passes(
    classified: &ClassifiedMap,
    markers: &[DistanceMarker],
    config: &LandmarkConfig,
    selection: Selection,
) -> Selection {
    named_of_kind(classified, markers, LandmarkKind::Pass).fold(selection, |sel, c| {
        let block = config.block_of(c.entry.km);
        if sel.claimed_blocks.contains(&block) {
            sel
        } else {
            sel.accept(c.entry.clone(), block)
        }
    })
}

/// Pass 2: named rivers in blocks the passes left free.
///
/// A river whose `(type, name)` pair was already accepted before this pass
/// started is skipped.
pub fn select_rivers(
    classified: &ClassifiedMap,
    markers: &[DistanceMarker],
    config: &LandmarkConfig,
    selection: Selection,
) -> Selection {
    let earlier = selection.clone();
    named_of_kind(classified, markers, LandmarkKind::River).fold(selection, |sel, c| {
        let block = config.block_of(c.entry.km);
        if sel.claimed_blocks.contains(&block) || earlier.has_pair(c.entry.kind, &c.entry.name) {
            sel
        } else {
            sel.accept(c.entry.clone(), block)
        }
    })
}

/// Pass 3: the most populous named town of each still-free block.
///
/// Population ties keep the earlier town. A winner whose `(type, name)` pair
/// was accepted by an earlier pass is dropped and its block stays free.
pub fn select_towns(
    classified: &ClassifiedMap,
    markers: &[DistanceMarker],
    config: &LandmarkConfig,
    selection: Selection,
) -> Selection {
    let mut winners: BTreeMap<u32, &ClassifiedLandmark> = BTreeMap::new();
    for c in named_of_kind(classified, markers, LandmarkKind::Town) {
        let block = config.block_of(c.entry.km);
        if selection.claimed_blocks.contains(&block) {
            continue;
        }
        let replace = winners
            .get(&block)
            .map_or(true, |best| c.population > best.population);
        if replace {
            winners.insert(block, c);
        }
    }

    let earlier = selection.clone();
    winners.into_iter().fold(selection, |sel, (block, c)| {
        if earlier.has_pair(c.entry.kind, &c.entry.name) {
            sel
        } else {
            sel.accept(c.entry.clone(), block)
        }
    })
}

/// Drop the earlier of every consecutive pair closer than `min_separation_km`.
///
/// A single pass over the sorted keys: removals are decided against the
/// original neighbours and are not re-checked afterwards.
pub fn collapse_close_entries(entries: FilteredResult, min_separation_km: u32) -> FilteredResult {
    let keys: Vec<u32> = entries.keys().copied().collect();
    let doomed: HashSet<u32> = keys
        .windows(2)
        .filter(|pair| pair[1] - pair[0] < min_separation_km)
        .map(|pair| pair[0])
        .collect();

    entries
        .into_iter()
        .filter(|(km, _)| !doomed.contains(km))
        .collect()
}

/// Run the full filter pipeline over the classified markers.
pub fn filter_landmarks(
    classified: &ClassifiedMap,
    markers: &[DistanceMarker],
    config: &LandmarkConfig,
) -> FilteredResult {
    let selection = Selection::default();
    let selection = select_passes(classified, markers, config, selection);
    let selection = select_rivers(classified, markers, config, selection);
    let selection = select_towns(classified, markers, config, selection);

    collapse_close_entries(selection.accepted, config.min_separation_km)
}
