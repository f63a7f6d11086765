//! Uniform histogram over a filtered column.
//!
//! `Distribution` holds the sorted observations; bucket counts are computed
//! on demand while iterating, so iterating again restarts from the first
//! bucket and yields the same sequence.

use serde::{Serialize, Serializer};

use super::{observed_values, EngineError, FilteredView};
use crate::domain::Outcome;

/// One histogram bucket: `[start, end)`, or `[start, end]` for the last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    sorted: Vec<f64>,
    bucket_count: usize,
}

impl Distribution {
    /// `None` when there are no observations.
    pub fn from_values(mut values: Vec<f64>, bucket_count: usize) -> Result<Option<Self>, EngineError> {
        if bucket_count == 0 {
            return Err(EngineError::InvalidArgument(
                "bucket count must be at least 1".to_string(),
            ));
        }
        values.retain(|v| v.is_finite());
        if values.is_empty() {
            return Ok(None);
        }
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(Some(Self {
            sorted: values,
            bucket_count,
        }))
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// Number of observations.
    pub fn observations(&self) -> usize {
        self.sorted.len()
    }

    /// Number of buckets yielded; a single bucket when every value is equal.
    pub fn len(&self) -> usize {
        if self.min() == self.max() {
            1
        } else {
            self.bucket_count
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> Buckets<'_> {
        Buckets {
            dist: self,
            next: 0,
        }
    }

    /// Index of the bucket containing `value`, if it lies in `[min, max]`.
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        if !(self.min()..=self.max()).contains(&value) {
            return None;
        }
        let last = self.len() - 1;
        (0..last)
            .find(|i| value < self.edge(i + 1))
            .or(Some(last))
    }

    /// Boundary `i` of `len() + 1`; boundary 0 is the min, the last the max.
    fn edge(&self, i: usize) -> f64 {
        let n = self.len();
        if i >= n {
            return self.max();
        }
        let (min, max) = (self.min(), self.max());
        (min + (max - min) * i as f64 / n as f64).min(max)
    }

    /// Observations strictly below `x`.
    fn count_below(&self, x: f64) -> usize {
        self.sorted.partition_point(|v| *v < x)
    }

    fn bucket(&self, i: usize) -> Bucket {
        let start = self.edge(i);
        let end = self.edge(i + 1);
        let below_start = self.count_below(start);
        let count = if i + 1 == self.len() {
            self.sorted.len() - below_start
        } else {
            self.count_below(end) - below_start
        };
        Bucket { start, end, count }
    }
}

/// Lazy bucket sequence of a [`Distribution`].
#[derive(Debug, Clone)]
pub struct Buckets<'a> {
    dist: &'a Distribution,
    next: usize,
}

impl Iterator for Buckets<'_> {
    type Item = Bucket;

    fn next(&mut self) -> Option<Bucket> {
        if self.next >= self.dist.len() {
            return None;
        }
        let bucket = self.dist.bucket(self.next);
        self.next += 1;
        Some(bucket)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dist.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Buckets<'_> {}

impl<'a> IntoIterator for &'a Distribution {
    type Item = Bucket;
    type IntoIter = Buckets<'a>;

    fn into_iter(self) -> Buckets<'a> {
        self.iter()
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Summary {
            min: f64,
            max: f64,
            observations: usize,
            buckets: Vec<Bucket>,
        }

        Summary {
            min: self.min(),
            max: self.max(),
            observations: self.observations(),
            buckets: self.iter().collect(),
        }
        .serialize(serializer)
    }
}

/// Histogram of `column` in `view` with `bucket_count` uniform buckets over
/// the observed range.
pub fn distribution(
    view: &FilteredView,
    column: &str,
    bucket_count: usize,
) -> Result<Outcome<Distribution>, EngineError> {
    let values = observed_values(view.frame(), column)?;
    Ok(Distribution::from_values(values, bucket_count)?.into())
}
