//! Search structures answering "which stored values lie within tolerance of this target".
//!
//! [`SortedIndex`] binary searches a sorted array and expands around the hit, while
//! [`BucketIndex`] partitions the values into buckets one tolerance wide and scans
//! the target's bucket and its two neighbors. Both are built once and queried many
//! times, and both implement [`ToleranceSearch`].
use std::cmp::Ordering;

use thiserror::Error;

use crate::tolerance::Tolerance;

/// The most buckets a [`BucketIndex`] will allocate
pub const MAX_BUCKETS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    #[error("A bucketed index requires an absolute tolerance, but {0} was given")]
    RelativeTolerance(Tolerance),
    #[error("A bucket width must be positive and finite, but {0} was given")]
    InvalidWidth(f64),
    #[error("Buckets {width} wide over a span of {span} would need more than {max} buckets", max = MAX_BUCKETS)]
    TooManyBuckets { width: f64, span: f64 },
}

/// Applies a [`Tolerance`] to a pair of values.
///
/// A relative tolerance is measured against `base` when one is set, and otherwise
/// against the stored value. An absolute tolerance is widened by `scale`, which
/// callers set to the charge state being searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceMatcher {
    pub tolerance: Tolerance,
    pub base: Option<f64>,
    pub scale: f64,
}

impl ToleranceMatcher {
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            base: None,
            scale: 1.0,
        }
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Configure the matcher for a search at `charge`.
    ///
    /// A relative tolerance becomes relative to `target`, an absolute tolerance is
    /// scaled by the charge.
    pub fn for_charge(self, target: f64, charge: i32) -> Self {
        match self.tolerance {
            Tolerance::PPM(_) => self.with_base(target),
            Tolerance::Da(_) => self.with_scale(charge as f64),
        }
    }

    #[inline]
    pub fn matches(&self, value: f64, target: f64) -> bool {
        match self.tolerance {
            Tolerance::PPM(tol) => {
                let reference = self.base.unwrap_or(value);
                (value - target).abs() / reference * 1e6 < tol
            }
            Tolerance::Da(tol) => (value - target).abs() < tol * self.scale,
        }
    }

    /// The absolute width of the window, when it doesn't depend on the values compared
    pub fn absolute_width(&self) -> Option<f64> {
        match self.tolerance * self.scale {
            Tolerance::PPM(_) => None,
            Tolerance::Da(width) => Some(width),
        }
    }
}

/// A stored search key and the payload it carries
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedValue<T> {
    pub value: f64,
    pub payload: T,
}

impl<T> IndexedValue<T> {
    pub fn new(value: f64, payload: T) -> Self {
        Self { value, payload }
    }
}

pub trait ToleranceSearch<T> {
    /// All entries whose keys are within tolerance of `target`, in ascending key order
    fn search(&self, target: f64) -> Vec<&IndexedValue<T>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All payloads whose keys are within tolerance of `target`
    fn query(&self, target: f64) -> Vec<&T> {
        self.search(target).into_iter().map(|v| &v.payload).collect()
    }

    fn contains(&self, target: f64) -> bool {
        !self.search(target).is_empty()
    }
}

fn sort_entries<T>(entries: &mut [IndexedValue<T>]) {
    entries.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// A sorted array searched by bisection.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedIndex<T = ()> {
    entries: Vec<IndexedValue<T>>,
    matcher: ToleranceMatcher,
}

impl<T> SortedIndex<T> {
    pub fn new<I: IntoIterator<Item = (f64, T)>>(entries: I, tolerance: Tolerance) -> Self {
        let mut entries: Vec<_> = entries
            .into_iter()
            .map(|(value, payload)| IndexedValue::new(value, payload))
            .collect();
        sort_entries(&mut entries);
        Self {
            entries,
            matcher: ToleranceMatcher::new(tolerance),
        }
    }

    pub fn matcher(&self) -> &ToleranceMatcher {
        &self.matcher
    }

    pub fn set_base(&mut self, base: Option<f64>) {
        self.matcher.base = base;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.matcher.scale = scale;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexedValue<T>> {
        self.entries.iter()
    }

    /// Locate any entry within tolerance of `target` under `matcher`
    fn bisect(&self, matcher: &ToleranceMatcher, target: f64) -> Option<usize> {
        let mut lo = 0;
        let mut hi = self.entries.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let value = self.entries[mid].value;
            if matcher.matches(value, target) {
                return Some(mid);
            }
            match value.total_cmp(&target) {
                Ordering::Less => lo = mid + 1,
                _ => hi = mid,
            }
        }
        None
    }

    /// Search with a matcher other than the index's own, so a shared index can be
    /// queried under per-call base and scale settings.
    pub fn search_with(&self, matcher: &ToleranceMatcher, target: f64) -> &[IndexedValue<T>] {
        let Some(hit) = self.bisect(matcher, target) else {
            return &[];
        };
        let mut start = hit;
        while start > 0 && matcher.matches(self.entries[start - 1].value, target) {
            start -= 1;
        }
        let mut end = hit + 1;
        while end < self.entries.len() && matcher.matches(self.entries[end].value, target) {
            end += 1;
        }
        &self.entries[start..end]
    }

    pub fn contains_with(&self, matcher: &ToleranceMatcher, target: f64) -> bool {
        self.bisect(matcher, target).is_some()
    }
}

impl SortedIndex<()> {
    /// Build a key-only index
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I, tolerance: Tolerance) -> Self {
        Self::new(values.into_iter().map(|v| (v, ())), tolerance)
    }
}

impl<T> ToleranceSearch<T> for SortedIndex<T> {
    fn search(&self, target: f64) -> Vec<&IndexedValue<T>> {
        self.search_with(&self.matcher, target).iter().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, target: f64) -> bool {
        self.contains_with(&self.matcher, target)
    }
}

/// Values partitioned into fixed-width buckets. Only absolute tolerances are
/// supported since the bucket width must not depend on the values compared, and
/// the width must leave at most [`MAX_BUCKETS`] buckets over the values' span.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketIndex<T> {
    buckets: Vec<Vec<IndexedValue<T>>>,
    start: f64,
    width: f64,
    matcher: ToleranceMatcher,
    size: usize,
}

impl<T> BucketIndex<T> {
    pub fn new<I: IntoIterator<Item = (f64, T)>>(
        entries: I,
        tolerance: Tolerance,
    ) -> Result<Self, IndexError> {
        Self::with_scale(entries, tolerance, 1.0)
    }

    pub fn with_scale<I: IntoIterator<Item = (f64, T)>>(
        entries: I,
        tolerance: Tolerance,
        scale: f64,
    ) -> Result<Self, IndexError> {
        let matcher = ToleranceMatcher::new(tolerance).with_scale(scale);
        let width = matcher
            .absolute_width()
            .ok_or(IndexError::RelativeTolerance(tolerance))?;
        if !(width > 0.0 && width.is_finite()) {
            return Err(IndexError::InvalidWidth(width));
        }

        let mut entries: Vec<_> = entries
            .into_iter()
            .map(|(value, payload)| IndexedValue::new(value, payload))
            .collect();
        sort_entries(&mut entries);
        let size = entries.len();

        let (start, end) = match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => (first.value, last.value),
            _ => {
                return Ok(Self {
                    buckets: Vec::new(),
                    start: 0.0,
                    width,
                    matcher,
                    size,
                })
            }
        };

        let span = end - start;
        let n_buckets = (span / width).floor();
        if !(n_buckets < MAX_BUCKETS as f64) {
            return Err(IndexError::TooManyBuckets { width, span });
        }
        let n_buckets = n_buckets as usize + 1;
        let mut buckets: Vec<Vec<IndexedValue<T>>> = (0..n_buckets).map(|_| Vec::new()).collect();
        for entry in entries {
            let i = (((entry.value - start) / width).floor() as usize).min(n_buckets - 1);
            buckets[i].push(entry);
        }
        Ok(Self {
            buckets,
            start,
            width,
            matcher,
            size,
        })
    }

    pub fn matcher(&self) -> &ToleranceMatcher {
        &self.matcher
    }

    pub fn bucket_width(&self) -> f64 {
        self.width
    }

    fn bucket_of(&self, target: f64) -> i64 {
        ((target - self.start) / self.width).floor() as i64
    }
}

impl<T> ToleranceSearch<T> for BucketIndex<T> {
    fn search(&self, target: f64) -> Vec<&IndexedValue<T>> {
        let n = self.buckets.len() as i64;
        let center = self.bucket_of(target);
        let lo = (center - 1).max(0);
        let hi = (center + 1).min(n - 1);
        let mut hits = Vec::new();
        if lo > hi {
            return hits;
        }
        for bucket in &self.buckets[lo as usize..=hi as usize] {
            hits.extend(
                bucket
                    .iter()
                    .filter(|entry| self.matcher.matches(entry.value, target)),
            );
        }
        hits
    }

    fn len(&self) -> usize {
        self.size
    }
}
