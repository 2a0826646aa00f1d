//! Bound fold for heterogeneous aggregates.
//!
//! Struct-like types mix fields of different bases at arbitrary byte
//! displacements, so none of the replicating rules in
//! [`attrs`](crate::attrs) apply. This pass folds each field's block span
//! into one set of bounds, sums payload and element counts, and pads the
//! extent to the widest field alignment.
//!
//! Fields with a zero blocklength contribute nothing.

use crate::attrs::{block_bounds, Bounds};
use crate::{BasicType, LayoutAttrs, StructField};

/// Running state across nonzero fields.
struct Fold {
    bounds: Bounds,
    true_bounds: Bounds,
    size: i64,
    n_builtin_elements: i64,
    alignsize: i64,
    builtin_element_size: Option<i64>,
    basic_type: Option<BasicType>,
    all_contig: bool,
}

/// Fold the fields of an aggregate into its layout attributes.
///
/// Returns `None` when no field has a nonzero blocklength; the caller uses
/// the zero-length layout then. The result is contiguous only when its
/// payload fills the extent and every field is contiguous. Callers must
/// additionally require a single block.
pub fn fold(fields: &[StructField<'_>]) -> Option<LayoutAttrs> {
    let mut acc: Option<Fold> = None;

    for field in fields.iter().filter(|field| field.blocklength != 0) {
        let old = field.base.layout();
        let count = i64::from(field.blocklength);

        let bounds = block_bounds(count, field.displacement, &old);
        let true_bounds = Bounds {
            lb: bounds.lb + old.true_lb_offset(),
            ub: bounds.ub + old.true_ub_offset(),
        };

        acc = Some(match acc {
            None => Fold {
                bounds,
                true_bounds,
                size: count * old.size,
                n_builtin_elements: count * old.n_builtin_elements,
                alignsize: old.alignsize,
                builtin_element_size: old.builtin_element_size,
                basic_type: old.basic_type,
                all_contig: old.is_contig,
            },
            Some(fold) => {
                let same_size = fold.builtin_element_size == old.builtin_element_size;
                Fold {
                    bounds: fold.bounds.union(bounds),
                    true_bounds: fold.true_bounds.union(true_bounds),
                    size: fold.size + count * old.size,
                    n_builtin_elements: fold.n_builtin_elements
                        + count * old.n_builtin_elements,
                    alignsize: fold.alignsize.max(old.alignsize),
                    builtin_element_size: fold.builtin_element_size.filter(|_| same_size),
                    basic_type: fold
                        .basic_type
                        .filter(|&basic| same_size && Some(basic) == old.basic_type),
                    all_contig: fold.all_contig && old.is_contig,
                }
            }
        });
    }

    acc.map(Fold::finish)
}

impl Fold {
    fn finish(self) -> LayoutAttrs {
        let lb = self.bounds.lb;
        let ub = self.bounds.ub + padding(self.bounds.ub - lb, self.alignsize);
        let extent = ub - lb;

        LayoutAttrs {
            size: self.size,
            lb,
            ub,
            true_lb: self.true_bounds.lb,
            true_ub: self.true_bounds.ub,
            extent,
            alignsize: self.alignsize,
            n_builtin_elements: self.n_builtin_elements,
            builtin_element_size: self.builtin_element_size,
            basic_type: self.basic_type,
            is_contig: self.all_contig && self.size == extent,
        }
    }
}

/// Bytes needed to round `extent` up to a multiple of `alignsize`.
fn padding(extent: i64, alignsize: i64) -> i64 {
    if alignsize <= 0 {
        return 0;
    }
    match extent.rem_euclid(alignsize) {
        0 => 0,
        epsilon => alignsize - epsilon,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
