//! Instance matching between a baseline export and a comparison export.
//!
//! Instances are paired by SOP Instance UID. An instance without a UID falls
//! back to its (series UID, position within series) key; such pairs are
//! flagged [`MatchMethod::SeriesPosition`] so reports can tell them apart.

mod report;

pub use report::{InstanceMatching, InstanceRef, MatchMethod, MatchedPair, StructuralError};

use std::collections::{BTreeSet, HashMap};

use crate::model::{Export, Instance, InstanceUid};

/// Checks that an export can be compared at all.
pub fn check_export(export: &Export) -> Result<(), StructuralError> {
    if export.is_empty() {
        return Err(StructuralError::NoInstances {
            label: export.label.clone(),
        });
    }

    let mut seen: HashMap<&InstanceUid, usize> = HashMap::new();
    let mut duplicates: BTreeSet<String> = BTreeSet::new();
    for uid in export.instances.iter().filter_map(|i| i.uid.as_ref()) {
        let count = seen.entry(uid).or_insert(0);
        *count += 1;
        if *count > 1 {
            duplicates.insert(uid.to_string());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(StructuralError::DuplicateUids {
            label: export.label.clone(),
            uids: duplicates.into_iter().collect(),
        })
    }
}

/// Partitions two instance sets into matched pairs, missing and extra.
///
/// Every baseline index ends up in exactly one of `pairs` / `missing`, every
/// comparison index in exactly one of `pairs` / `extra`. Pairs are listed in
/// baseline order.
pub fn match_instances(baseline: &[Instance], comparison: &[Instance]) -> InstanceMatching {
    let comparison_by_uid = index_by_uid(comparison);

    let mut paired_baseline: Vec<Option<MatchedPair>> = vec![None; baseline.len()];
    let mut used_comparison = vec![false; comparison.len()];

    for (b_idx, instance) in baseline.iter().enumerate() {
        let Some(uid) = &instance.uid else {
            continue;
        };
        if let Some(&c_idx) = comparison_by_uid.get(uid) {
            if !used_comparison[c_idx] {
                used_comparison[c_idx] = true;
                paired_baseline[b_idx] = Some(MatchedPair {
                    baseline: b_idx,
                    comparison: c_idx,
                    method: MatchMethod::Uid,
                });
            }
        }
    }

    // Fallback: series position, only where at least one side lacks a UID.
    let baseline_positions = series_positions(baseline);
    let comparison_by_position: HashMap<(&str, usize), usize> = series_positions(comparison)
        .into_iter()
        .enumerate()
        .filter_map(|(c_idx, key)| key.map(|k| (k, c_idx)))
        .collect();

    for (b_idx, key) in baseline_positions.into_iter().enumerate() {
        if paired_baseline[b_idx].is_some() {
            continue;
        }
        let Some(key) = key else {
            continue;
        };
        let Some(&c_idx) = comparison_by_position.get(&key) else {
            continue;
        };
        if used_comparison[c_idx] {
            continue;
        }
        if baseline[b_idx].uid.is_some() && comparison[c_idx].uid.is_some() {
            continue;
        }
        used_comparison[c_idx] = true;
        paired_baseline[b_idx] = Some(MatchedPair {
            baseline: b_idx,
            comparison: c_idx,
            method: MatchMethod::SeriesPosition,
        });
    }

    let mut matching = InstanceMatching::default();
    for (b_idx, pair) in paired_baseline.into_iter().enumerate() {
        match pair {
            Some(pair) => matching.pairs.push(pair),
            None => matching.missing.push(b_idx),
        }
    }
    matching.extra = used_comparison
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(idx, _)| idx)
        .collect();

    matching
}

/// Identifier shown for a matched pair: whichever side carries a UID, else
/// the baseline file path.
pub fn pair_id(baseline: &Instance, comparison: &Instance) -> String {
    match baseline.uid.as_ref().or(comparison.uid.as_ref()) {
        Some(uid) => uid.to_string(),
        None => baseline.display_id(),
    }
}

/// UID → index; the first occurrence of a duplicated UID wins.
fn index_by_uid(instances: &[Instance]) -> HashMap<&InstanceUid, usize> {
    let mut map = HashMap::with_capacity(instances.len());
    for (idx, instance) in instances.iter().enumerate() {
        if let Some(uid) = &instance.uid {
            map.entry(uid).or_insert(idx);
        }
    }
    map
}

/// (series UID, position within that series) for every instance, in input
/// order. Instances without a series UID get `None`.
fn series_positions(instances: &[Instance]) -> Vec<Option<(&str, usize)>> {
    let mut counters: HashMap<&str, usize> = HashMap::new();
    instances
        .iter()
        .map(|instance| {
            let series = instance.series_uid.as_deref()?;
            let counter = counters.entry(series).or_insert(0);
            let position = *counter;
            *counter += 1;
            Some((series, position))
        })
        .collect()
}
