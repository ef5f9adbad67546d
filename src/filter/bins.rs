//! Equal-width numeric buckets for the range filters.
//!
//! Bucket boundaries are derived once from the loaded record set and stay
//! fixed for the session. The trees filter additionally carries a sentinel
//! bucket for values that are present but not numeric; the area filter does
//! not.

use crate::data::record::SiteRecord;
use crate::filter::numeric::{self, Numeric};
use crate::locale::Labels;

pub const DEFAULT_BIN_COUNT: usize = 5;

/// Identity of one selectable range option.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BucketId {
    /// Closed interval, both ends inclusive.
    Range { lo: i64, hi: i64 },
    /// Present-but-unparseable values (trees only).
    NonNumeric,
}

/// A selectable range option with its display label.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub id: BucketId,
    pub label: String,
}

/// Split `[min, max]` into up to `k` consecutive closed integer intervals of
/// equal width, the last one absorbing the rounding slack so the union covers
/// exactly `[min, max]`. Operand order is normalized; `min == max` yields a
/// single degenerate interval. Intervals that would start past `max` are not
/// emitted, so every returned interval is non-empty.
pub fn equal_width_bins(min: i64, max: i64, k: usize) -> Vec<(i64, i64)> {
    let (min, max) = if max < min { (max, min) } else { (min, max) };
    if k == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![(min, min)];
    }

    let span = max - min + 1;
    let width = (span + k as i64 - 1) / k as i64;
    let mut bins = Vec::with_capacity(k);
    let mut lo = min;
    for i in 0..k {
        if lo > max {
            break;
        }
        let hi = if i == k - 1 { max } else { (lo + width - 1).min(max) };
        bins.push((lo, hi));
        lo = hi + 1;
    }
    bins
}

fn range_label(lo: i64, hi: i64, unit: Option<&str>) -> String {
    match unit {
        Some(u) => format!("{lo}–{hi} {u}"),
        None => format!("{lo}–{hi}"),
    }
}

/// Range options for the trees filter: equal-width bins over the parsed
/// integer values, plus the sentinel bucket when any record carries a
/// present-but-unparseable value.
pub fn tree_buckets(records: &[SiteRecord], labels: &Labels) -> Vec<Bucket> {
    let mut nums: Vec<i64> = Vec::new();
    let mut has_non_numeric = false;
    for record in records {
        match numeric::integer_of(record.number_of_trees.as_deref()) {
            Numeric::Value(n) => nums.push(n),
            Numeric::NonNumeric => has_non_numeric = true,
            Numeric::Absent => {}
        }
    }

    let mut buckets = Vec::new();
    if let (Some(&min), Some(&max)) = (nums.iter().min(), nums.iter().max()) {
        for (lo, hi) in equal_width_bins(min, max, DEFAULT_BIN_COUNT) {
            buckets.push(Bucket {
                id: BucketId::Range { lo, hi },
                label: range_label(lo, hi, None),
            });
        }
    }
    if has_non_numeric {
        buckets.push(Bucket {
            id: BucketId::NonNumeric,
            label: labels.non_numeric.to_string(),
        });
    }
    buckets
}

/// Range options for the area filter: bins over `floor(min)`/`ceil(max)` of
/// the parsed real values. Records without a parseable area contribute
/// nothing here and fail every area selection later.
pub fn area_buckets(records: &[SiteRecord], labels: &Labels) -> Vec<Bucket> {
    let nums: Vec<f64> = records
        .iter()
        .filter_map(|r| numeric::real_of(r.area_m2.as_deref()).value())
        .collect();

    if nums.is_empty() {
        return Vec::new();
    }
    let min = nums.iter().copied().fold(f64::INFINITY, f64::min);
    let max = nums.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    equal_width_bins(min.floor() as i64, max.ceil() as i64, DEFAULT_BIN_COUNT)
        .into_iter()
        .map(|(lo, hi)| Bucket {
            id: BucketId::Range { lo, hi },
            label: range_label(lo, hi, Some(labels.area_unit)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{labels, Lang};

    fn record_with_trees(raw: Option<&str>) -> SiteRecord {
        SiteRecord {
            number_of_trees: raw.map(str::to_string),
            ..SiteRecord::default()
        }
    }

    fn record_with_area(raw: Option<&str>) -> SiteRecord {
        SiteRecord {
            area_m2: raw.map(str::to_string),
            ..SiteRecord::default()
        }
    }

    #[test]
    fn test_bins_partition_exactly() {
        let bins = equal_width_bins(10, 300, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.first().map(|b| b.0), Some(10));
        assert_eq!(bins.last().map(|b| b.1), Some(300));
        for pair in bins.windows(2) {
            // contiguous, ascending, no overlap
            assert_eq!(pair[1].0, pair[0].1 + 1);
        }
        for (lo, hi) in bins {
            assert!(lo <= hi);
        }
    }

    #[test]
    fn test_bins_swap_operands() {
        assert_eq!(equal_width_bins(300, 10, 5), equal_width_bins(10, 300, 5));
    }

    #[test]
    fn test_single_value_range() {
        for k in [1, 2, 5, 9] {
            assert_eq!(equal_width_bins(7, 7, k), vec![(7, 7)]);
        }
    }

    #[test]
    fn test_narrow_range_never_overshoots() {
        // 6 values into 5 requested bins: width rounds up to 2, so only 3
        // well-formed bins fit.
        let bins = equal_width_bins(0, 5, 5);
        assert_eq!(bins, vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[test]
    fn test_negative_range() {
        let bins = equal_width_bins(-10, 10, 5);
        assert_eq!(bins.first().map(|b| b.0), Some(-10));
        assert_eq!(bins.last().map(|b| b.1), Some(10));
        assert_eq!(bins.len(), 5);
    }

    #[test]
    fn test_tree_buckets_with_sentinel() {
        let records = vec![
            record_with_trees(Some("10")),
            record_with_trees(Some("50")),
            record_with_trees(Some("300")),
            record_with_trees(Some("greenhouse")),
            record_with_trees(None),
        ];
        let buckets = tree_buckets(&records, labels(Lang::En));
        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0].id, BucketId::Range { lo: 10, hi: 68 });
        assert_eq!(buckets[4].id, BucketId::Range { lo: 246, hi: 300 });
        assert_eq!(buckets[5].id, BucketId::NonNumeric);
        assert_eq!(buckets[5].label, "Greenhouse");
    }

    #[test]
    fn test_tree_buckets_without_numeric_values() {
        let records = vec![record_with_trees(Some("greenhouse")), record_with_trees(None)];
        let buckets = tree_buckets(&records, labels(Lang::En));
        // degraded control: sentinel only
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].id, BucketId::NonNumeric);
    }

    #[test]
    fn test_area_buckets_floor_and_ceil() {
        let records = vec![
            record_with_area(Some("10.4")),
            record_with_area(Some("99.2")),
            record_with_area(Some("n/a")),
            record_with_area(None),
        ];
        let buckets = area_buckets(&records, labels(Lang::En));
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].id, BucketId::Range { lo: 10, hi: 28 });
        assert_eq!(buckets[4].id, BucketId::Range { lo: 86, hi: 100 });
        assert!(buckets[0].label.ends_with("m²"));
        assert!(!buckets.iter().any(|b| b.id == BucketId::NonNumeric));
    }

    #[test]
    fn test_area_buckets_empty_without_parseable_values() {
        let records = vec![record_with_area(Some("n/a")), record_with_area(None)];
        assert!(area_buckets(&records, labels(Lang::En)).is_empty());
    }
}
