//! Merging of overlapping series fragments into one continuous series.

use std::collections::BTreeSet;

use super::{SecondaryAxis, Series};

/// Merges an ordered collection of possibly-overlapping, possibly-absent
/// fragments into a single gap-free, duplicate-free series.
///
/// Each present fragment must be internally sorted and non-self-overlapping.
/// Fragments are sorted by first timestamp, fragments that contribute no new
/// samples are dropped, and at every seam the later-starting fragment owns
/// the boundary, so no timestamp appears twice.
///
/// Metadata, column labels, and the secondary axis come from the earliest
/// surviving fragment only. The unit tag is applied when the fragments that
/// carry one agree on a single unit. When every fragment is filtered out the
/// result is an explicitly empty series shaped like the first present input;
/// with no present inputs at all the result is `None`.
pub fn merge(inputs: Vec<Option<Series>>) -> Option<Series> {
    let present: Vec<&Series> = inputs.iter().flatten().collect();
    let template = *present.first()?;

    let mut frags: Vec<&Series> = present.iter().copied().filter(|s| !s.is_empty()).collect();
    frags.sort_by_key(|s| s.first_time());

    // A fragment ending at or before its predecessor's end contributes
    // nothing new. Pairs are evaluated against the sorted order, not against
    // the surviving predecessor.
    let keep: Vec<bool> = (0..frags.len())
        .map(|i| i == 0 || frags[i - 1].last_time() < frags[i].last_time())
        .collect();
    let frags: Vec<&Series> = frags
        .into_iter()
        .zip(&keep)
        .filter_map(|(frag, keep)| keep.then_some(frag))
        .collect();

    // Identical-start duplicates resolve in favor of the longer successor.
    let keep: Vec<bool> = (0..frags.len())
        .map(|i| {
            i + 1 >= frags.len()
                || frags[i + 1].first_time() != frags[i].first_time()
                || frags[i + 1].last_time() < frags[i].last_time()
        })
        .collect();
    let frags: Vec<&Series> = frags
        .into_iter()
        .zip(&keep)
        .filter_map(|(frag, keep)| keep.then_some(frag))
        .collect();

    if frags.is_empty() {
        return Some(Series::shaped_like(template));
    }

    // Per fragment, the number of leading samples kept: everything strictly
    // before the next fragment's first timestamp.
    let cuts: Vec<usize> = (0..frags.len())
        .map(|i| match frags.get(i + 1).and_then(|next| next.first_time()) {
            Some(next_start) if frags[i].last_time() >= Some(next_start) => {
                frags[i].index_at_or_after(next_start)
            }
            _ => frags[i].len(),
        })
        .collect();

    let total: usize = cuts.iter().sum();
    let mut time = Vec::with_capacity(total);
    let mut values = Vec::with_capacity(total);

    let per_row_axis = frags
        .iter()
        .all(|s| matches!(s.axis(), Some(SecondaryAxis::PerRow(_))));
    let mut axis_rows: Vec<Vec<f64>> = if per_row_axis {
        Vec::with_capacity(total)
    } else {
        Vec::new()
    };

    for (frag, cut) in frags.iter().zip(&cuts) {
        time.extend_from_slice(&frag.time[..*cut]);
        values.extend_from_slice(&frag.values[..*cut]);
        if per_row_axis {
            if let Some(SecondaryAxis::PerRow(rows)) = frag.axis() {
                axis_rows.extend_from_slice(&rows[..*cut]);
            }
        }
    }

    let units: BTreeSet<&str> = frags.iter().filter_map(|s| s.unit()).collect();
    let unit = if units.len() == 1 {
        units.iter().next().map(|u| u.to_string())
    } else {
        None
    };

    let earliest = frags[0];
    let axis = match earliest.axis {
        Some(SecondaryAxis::PerRow(_)) if per_row_axis => Some(SecondaryAxis::PerRow(axis_rows)),
        // A row-aligned axis cannot survive a merge with axis-less fragments
        Some(SecondaryAxis::PerRow(_)) => None,
        ref other => other.clone(),
    };

    Some(Series {
        time,
        values,
        meta: earliest.meta.clone(),
        columns: earliest.columns.clone(),
        unit,
        axis,
    })
}
