use std::collections::HashSet;

use chrono::Local;

/// Returns the candidates that are not yet known, in input order.
///
/// Repeated candidates are collapsed to their first occurrence, so the result never asks
/// for the same id twice.
pub fn filter_new(candidates: &[String], known: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|id| !known.contains(*id) && seen.insert(*id))
        .cloned()
        .collect()
}

/// Removes repeated ids, keeping the first occurrence of each.
pub fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Number of batches needed for `total` items.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

/// Timestamp used in run log file names, e.g. `2024-03-01_14-05_09`.
pub fn log_file_timestamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M_%S").to_string()
}
