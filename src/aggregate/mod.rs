//! Aggregation of per-scale similarity maps.

use crate::image::Grid;
use crate::score::SimilarityMap;
use crate::trace::trace_span;
use crate::util::{BlobCorrError, BlobCorrResult};

/// Elementwise reduction applied across the stack of similarity maps.
///
/// A closed strategy set keeps the contract checkable: the common reductions
/// are named variants, and `Custom` admits a plain function over the
/// per-pixel value stack for anything else.
#[derive(Clone, Copy, Debug)]
pub enum Reduction {
    /// Elementwise arithmetic mean.
    Mean,
    /// Elementwise median; an even stack averages the two middle values.
    Median,
    /// Elementwise maximum.
    Max,
    /// Caller-supplied reduction over one pixel's values across all maps.
    Custom(fn(&[f32]) -> f32),
}

impl Default for Reduction {
    fn default() -> Self {
        Reduction::Mean
    }
}

impl Reduction {
    /// Returns a short identifier for logs and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Mean => "mean",
            Reduction::Median => "median",
            Reduction::Max => "max",
            Reduction::Custom(_) => "custom",
        }
    }
}

/// Combined similarity surface plus the inputs that produced it.
#[derive(Debug)]
pub struct AggregatedMap {
    map: Grid,
    reduction: Reduction,
    base_maps: Vec<SimilarityMap>,
}

impl AggregatedMap {
    /// Returns the reduced grid.
    pub fn map(&self) -> &Grid {
        &self.map
    }

    /// Returns the reduction that produced the grid.
    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Returns the contributing maps in their original order.
    pub fn base_maps(&self) -> &[SimilarityMap] {
        &self.base_maps
    }

    /// Consumes the aggregate, returning the reduced grid.
    pub fn into_grid(self) -> Grid {
        self.map
    }
}

/// Reduces an ordered sequence of same-shape similarity maps into one map.
///
/// The maps are stacked along a new leading axis and reduced elementwise.
/// No renormalization is applied afterwards; interpreting the combined scale
/// is the caller's concern. The input order is preserved in `base_maps`.
pub fn aggregate(maps: Vec<SimilarityMap>, reduction: Reduction) -> BlobCorrResult<AggregatedMap> {
    let first = maps.first().ok_or(BlobCorrError::EmptyInput)?;
    let width = first.map().width();
    let height = first.map().height();
    for m in &maps {
        if m.map().width() != width || m.map().height() != height {
            return Err(BlobCorrError::ShapeMismatch {
                expected_width: width,
                expected_height: height,
                width: m.map().width(),
                height: m.map().height(),
            });
        }
    }

    let _span = trace_span!("aggregate", maps = maps.len(), reduction = reduction.name()).entered();

    let len = width * height;
    let count = maps.len();
    let mut data = vec![0.0f32; len];
    match reduction {
        Reduction::Mean => {
            for m in &maps {
                for (acc, &v) in data.iter_mut().zip(m.map().as_slice()) {
                    *acc += v;
                }
            }
            for acc in &mut data {
                *acc /= count as f32;
            }
        }
        Reduction::Max => {
            data.copy_from_slice(maps[0].map().as_slice());
            for m in &maps[1..] {
                for (acc, &v) in data.iter_mut().zip(m.map().as_slice()) {
                    *acc = acc.max(v);
                }
            }
        }
        Reduction::Median => {
            let mut stack = vec![0.0f32; count];
            for (idx, acc) in data.iter_mut().enumerate() {
                for (slot, m) in stack.iter_mut().zip(&maps) {
                    *slot = m.map().as_slice()[idx];
                }
                stack.sort_by(f32::total_cmp);
                let mid = count / 2;
                *acc = if count % 2 == 1 {
                    stack[mid]
                } else {
                    (stack[mid - 1] + stack[mid]) / 2.0
                };
            }
        }
        Reduction::Custom(f) => {
            let mut stack = vec![0.0f32; count];
            for (idx, acc) in data.iter_mut().enumerate() {
                for (slot, m) in stack.iter_mut().zip(&maps) {
                    *slot = m.map().as_slice()[idx];
                }
                *acc = f(&stack);
            }
        }
    }

    let map = Grid::new(data, width, height)?;
    Ok(AggregatedMap {
        map,
        reduction,
        base_maps: maps,
    })
}

#[cfg(test)]
mod tests {
    use super::{aggregate, Reduction};
    use crate::image::Grid;
    use crate::score::SimilarityMap;
    use crate::util::BlobCorrError;
    use crate::KernelParam;

    fn map_of(values: Vec<f32>, width: usize, height: usize) -> SimilarityMap {
        SimilarityMap::new(
            Grid::new(values, width, height).unwrap(),
            KernelParam::new(3, 1.0).unwrap(),
        )
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = aggregate(Vec::new(), Reduction::Mean).err().unwrap();
        assert_eq!(err, BlobCorrError::EmptyInput);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let a = map_of(vec![0.0; 6], 3, 2);
        let b = map_of(vec![0.0; 6], 2, 3);
        let err = aggregate(vec![a, b], Reduction::Mean).err().unwrap();
        assert_eq!(
            err,
            BlobCorrError::ShapeMismatch {
                expected_width: 3,
                expected_height: 2,
                width: 2,
                height: 3,
            }
        );
    }

    #[test]
    fn mean_of_two_maps() {
        let a = map_of(vec![0.0, 1.0, 2.0, 3.0], 2, 2);
        let b = map_of(vec![2.0, 3.0, 4.0, 5.0], 2, 2);
        let agg = aggregate(vec![a, b], Reduction::Mean).unwrap();
        assert_eq!(agg.map().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(agg.base_maps().len(), 2);
    }

    #[test]
    fn median_averages_even_stack() {
        let maps = vec![
            map_of(vec![1.0], 1, 1),
            map_of(vec![5.0], 1, 1),
            map_of(vec![2.0], 1, 1),
            map_of(vec![4.0], 1, 1),
        ];
        let agg = aggregate(maps, Reduction::Median).unwrap();
        assert!((agg.map().at(0, 0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn max_picks_elementwise_maximum() {
        let a = map_of(vec![0.1, 0.9], 2, 1);
        let b = map_of(vec![0.8, 0.2], 2, 1);
        let agg = aggregate(vec![a, b], Reduction::Max).unwrap();
        assert_eq!(agg.map().as_slice(), &[0.8, 0.9]);
    }

    #[test]
    fn custom_reduction_sees_stack_in_input_order() {
        fn first(stack: &[f32]) -> f32 {
            stack[0]
        }
        let a = map_of(vec![0.25], 1, 1);
        let b = map_of(vec![0.75], 1, 1);
        let agg = aggregate(vec![a, b], Reduction::Custom(first)).unwrap();
        assert!((agg.map().at(0, 0) - 0.25).abs() < 1e-6);
        assert_eq!(agg.reduction().name(), "custom");
    }
}
