//! Contiguous-block estimator.
//!
//! Produces `num_contig_blocks` for a new type without walking its byte
//! runs. The estimate is an upper bound on the runs a full walk would find:
//! it multiplies the base's count through the replication and never
//! notices runs that re-merge across block boundaries.
//!
//! # Fast-Path Collapse
//!
//! When the base is contiguous and the combinator places its copies so they
//! abut, the count is exactly 1. Downstream transfer code then issues one
//! bulk copy instead of a blocked scatter/gather, so every combinator
//! checks for this before falling back to the multiplicative bound.
//!
//! For the index-style combinators over a contiguous base the count comes
//! from [`indexed_runs`] / [`block_indexed_runs`], which merge adjacent
//! list entries and so are tighter than the multiplicative bound.

use crate::{Base, LayoutError, StructField, Units};

/// Block count of a basic element resized away from its own size: lower
/// gap, data, upper gap.
pub const RESIZED_BASIC_BLOCKS: i64 = 3;

/// Replicate with stride.
pub fn vector(base: Base<'_>, count: u32, blocklength: u32, stride: i64, units: Units) -> i64 {
    let old = base.layout();
    let blocklength = i64::from(blocklength);

    let eff_stride = units.to_bytes(stride, old.extent);
    if old.is_contig && eff_stride == blocklength * old.extent {
        tracing::debug!(count, blocklength, eff_stride, "vector collapses to one block");
        return 1;
    }

    match base {
        Base::Basic(_) => i64::from(count),
        Base::Derived(layout) => layout.num_contig_blocks * i64::from(count) * blocklength,
    }
}

/// Contiguous run; `is_contig` is the new type's contiguity.
pub fn contiguous(base: Base<'_>, count: u32, is_contig: bool) -> i64 {
    match base {
        Base::Basic(_) => 1,
        Base::Derived(_) if is_contig => 1,
        Base::Derived(layout) => i64::from(count) * layout.num_contig_blocks,
    }
}

/// Index by displacement list.
///
/// `runs` is the result of [`indexed_runs`], present only when the base is
/// contiguous.
pub fn indexed(base: Base<'_>, blocklengths: &[u32], runs: Option<i64>) -> i64 {
    if let Some(runs) = runs {
        return runs;
    }

    match base {
        Base::Basic(_) => len_i64(blocklengths.len()),
        Base::Derived(layout) => blocklengths
            .iter()
            .map(|&blocklength| layout.num_contig_blocks * i64::from(blocklength))
            .sum(),
    }
}

/// Index by uniform block.
///
/// `runs` is the result of [`block_indexed_runs`], present only when the
/// base is contiguous.
pub fn block_indexed(base: Base<'_>, count: usize, blocklength: u32, runs: Option<i64>) -> i64 {
    if let Some(runs) = runs {
        return runs;
    }

    match base {
        Base::Basic(_) => len_i64(count),
        Base::Derived(layout) => {
            len_i64(count) * layout.num_contig_blocks * i64::from(blocklength)
        }
    }
}

/// Bound override; `is_contig` is the new type's contiguity.
pub fn resized(base: Base<'_>, is_contig: bool) -> i64 {
    match base {
        Base::Basic(_) if is_contig => 1,
        Base::Basic(_) => RESIZED_BASIC_BLOCKS,
        Base::Derived(layout) => layout.num_contig_blocks,
    }
}

/// Heterogeneous aggregate. No collapse is attempted.
pub fn aggregate(fields: &[StructField<'_>]) -> i64 {
    fields
        .iter()
        .map(|field| match field.base {
            Base::Basic(_) => 1,
            Base::Derived(layout) => layout.num_contig_blocks * i64::from(field.blocklength),
        })
        .sum()
}

/// Count the maximal runs a displacement list forms over a contiguous base.
///
/// Zero-length entries are skipped. An entry extends the current run when
/// it starts exactly where the run ends. Returns 0 when every entry is
/// empty.
///
/// Blocklengths are widened into a scratch buffer first; failing to reserve
/// it is the only error.
pub fn indexed_runs(
    blocklengths: &[u32],
    displacements: &[i64],
    units: Units,
    old_extent: i64,
) -> Result<i64, LayoutError> {
    let widened = widen_blocklengths(blocklengths)?;

    let mut entries = widened
        .iter()
        .zip(displacements)
        .filter(|&(&blocklength, _)| blocklength != 0);

    let Some((&first_len, &first_disp)) = entries.next() else {
        return Ok(0);
    };

    let mut runs = 1;
    let mut run_start = first_disp;
    let mut run_len = first_len;

    for (&blocklength, &disp) in entries {
        let run_end = match units {
            Units::Elements => run_start + run_len,
            Units::Bytes => run_start + run_len * old_extent,
        };

        if run_end == disp {
            run_len += blocklength;
        } else {
            run_start = disp;
            run_len = blocklength;
            runs += 1;
        }
    }

    Ok(runs)
}

/// Count the maximal runs a uniform-block displacement list forms over a
/// contiguous base. Consecutive entries merge when the next starts where
/// the previous block ends.
pub fn block_indexed_runs(
    blocklength: u32,
    displacements: &[i64],
    units: Units,
    old_extent: i64,
) -> i64 {
    let step = match units {
        Units::Elements => i64::from(blocklength),
        Units::Bytes => i64::from(blocklength) * old_extent,
    };

    1 + displacements
        .windows(2)
        .fold(0, |breaks, pair| breaks + i64::from(pair[0] + step != pair[1]))
}

/// Copy blocklengths into a wide scratch buffer.
fn widen_blocklengths(blocklengths: &[u32]) -> Result<Vec<i64>, LayoutError> {
    let mut widened = Vec::new();
    widened
        .try_reserve_exact(blocklengths.len())
        .map_err(|_| LayoutError::OutOfMemory {
            requested: blocklengths.len().saturating_mul(std::mem::size_of::<i64>()),
        })?;
    widened.extend(blocklengths.iter().map(|&blocklength| i64::from(blocklength)));
    Ok(widened)
}

#[inline]
fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}
