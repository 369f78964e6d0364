//! Running elevation interval of everything loaded so far.
//!
//! The interval only ever widens during a view session. Consumers treat a
//! changed range as a signal to rebuild the projection's clip planes, so an
//! update that does not widen must hand back the previous value untouched.

use serde::{Deserialize, Serialize};

/// Vertical extent of one loaded tile (meters), from its header.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationBound {
    pub min: f64,
    pub max: f64,
}

impl ElevationBound {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Known elevation interval `[min, max]` (meters).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZRange {
    pub min: f64,
    pub max: f64,
}

impl ZRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.min, self.max]
    }

    pub fn contains(&self, bound: ElevationBound) -> bool {
        bound.min >= self.min && bound.max <= self.max
    }
}

/// Folds one load batch into `current`.
///
/// Absent entries (tiles still in flight or failed) are skipped. A batch with
/// nothing loaded returns `current` as is. The result widens `current` when the
/// batch reaches below its minimum or above its maximum, and otherwise is
/// `current` unchanged.
pub fn update_depth_range<I>(current: Option<ZRange>, batch: I) -> Option<ZRange>
where
    I: IntoIterator<Item = Option<ElevationBound>>,
{
    let mut loaded = batch.into_iter().flatten();
    let Some(first) = loaded.next() else {
        return current;
    };
    let (batch_min, batch_max) = loaded.fold((first.min, first.max), |(lo, hi), b| {
        (lo.min(b.min), hi.max(b.max))
    });

    match current {
        None => Some(ZRange::new(batch_min, batch_max)),
        Some(cur) if batch_min < cur.min || batch_max > cur.max => Some(ZRange::new(
            cur.min.min(batch_min),
            cur.max.max(batch_max),
        )),
        Some(cur) => Some(cur),
    }
}

/// Single-writer accumulator owned by the view-model.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DepthRange {
    range: Option<ZRange>,
}

impl DepthRange {
    pub fn new() -> Self {
        Self { range: None }
    }

    pub fn get(&self) -> Option<ZRange> {
        self.range
    }

    pub fn is_set(&self) -> bool {
        self.range.is_some()
    }

    /// Applies a batch; returns `true` only when the range actually changed.
    pub fn update<I>(&mut self, batch: I) -> bool
    where
        I: IntoIterator<Item = Option<ElevationBound>>,
    {
        let next = update_depth_range(self.range, batch);
        let changed = next != self.range;
        self.range = next;
        changed
    }
}
