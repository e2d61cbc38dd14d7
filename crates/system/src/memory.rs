/// Used memory as a percentage of total, one decimal.  `0.0` when the total
/// is unknown.
pub fn memory_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    note_core::round1(used as f64 / total as f64 * 100.0)
}
