//! Group-by Aggregation Module
//! A single generic group-by/reduce over sales records.

use crate::data::SalesRecord;
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// How a group's values collapse into one statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Mean,
    Sum,
}

impl Reduction {
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Reduction::Mean => values.iter().mean(),
            Reduction::Sum => values.iter().sum(),
        }
    }
}

/// f64 group key with a total order, so rates can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
pub struct RateKey(pub f64);

impl PartialEq for RateKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RateKey {}

impl PartialOrd for RateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Filter `records`, partition the survivors by `key`, and reduce `value`
/// within each partition.
///
/// Output is sorted by key. Keys with no surviving rows never appear.
pub fn aggregate<'a, I, K, P, F, V>(
    records: I,
    filter: P,
    key: F,
    value: V,
    reduction: Reduction,
) -> Vec<(K, f64)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
    K: Ord,
    P: Fn(&SalesRecord) -> bool,
    F: Fn(&SalesRecord) -> K,
    V: Fn(&SalesRecord) -> f64,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for record in records.into_iter().filter(|r| filter(r)) {
        groups.entry(key(record)).or_default().push(value(record));
    }

    groups
        .into_iter()
        .map(|(k, values)| (k, reduction.apply(&values)))
        .collect()
}
