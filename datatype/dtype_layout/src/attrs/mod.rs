//! Attribute calculator.
//!
//! Pure functions from a base type's layout facts and a combinator's
//! parameters to the new type's size, bounds, extent, alignment, element
//! facts and contiguity. No block counting happens here: see
//! [`blocks`](crate::blocks).
//!
//! Basic bases are handled by passing their synthesized layout
//! ([`TypeLayout::basic`]); none of the rules below need to know whether
//! the base was basic.
//!
//! # Contiguity
//!
//! A new type is contiguous only when its base is, its payload fills its
//! extent (`size == extent`), and the combinator's own placement leaves no
//! gap. For the index-style combinators the placement check is the run
//! count produced by [`blocks::indexed_runs`](crate::blocks::indexed_runs)
//! or [`blocks::block_indexed_runs`](crate::blocks::block_indexed_runs),
//! computed once by the caller and passed in.

mod bounds;

pub use bounds::{block_bounds, contig_bounds, vector_bounds, Bounds};

use crate::{LayoutAttrs, TypeLayout, Units};

/// Facts shared by every replicating combinator.
///
/// `replication` is the number of base instances in one new instance.
/// Contiguity starts out false; callers decide it once size and extent are
/// known.
fn replicate(old: &TypeLayout, bounds: Bounds, replication: i64) -> LayoutAttrs {
    LayoutAttrs {
        size: replication * old.size,
        lb: bounds.lb,
        ub: bounds.ub,
        true_lb: bounds.lb + old.true_lb_offset(),
        true_ub: bounds.ub + old.true_ub_offset(),
        extent: bounds.ub - bounds.lb,
        alignsize: old.alignsize,
        n_builtin_elements: replication * old.n_builtin_elements,
        builtin_element_size: old.builtin_element_size,
        basic_type: old.basic_type,
        is_contig: false,
    }
}

/// Replicate with stride: `count` blocks of `blocklength` base instances.
pub fn vector(
    count: u32,
    blocklength: u32,
    stride: i64,
    units: Units,
    old: &TypeLayout,
) -> LayoutAttrs {
    let count = i64::from(count);
    let blocklength = i64::from(blocklength);
    let eff_stride = units.to_bytes(stride, old.extent);

    let bounds = vector_bounds(count, eff_stride, blocklength, old);
    let mut attrs = replicate(old, bounds, count * blocklength);

    // Blocks must abut exactly: no gap between them and no overlap.
    attrs.is_contig =
        old.is_contig && attrs.size == attrs.extent && eff_stride == blocklength * old.size;
    attrs
}

/// Contiguous run of `count` base instances.
pub fn contiguous(count: u32, old: &TypeLayout) -> LayoutAttrs {
    let count = i64::from(count);
    let bounds = contig_bounds(count, old);
    let mut attrs = replicate(old, bounds, count);
    attrs.is_contig = old.is_contig;
    attrs
}

/// Index by displacement list.
///
/// `runs` is the contiguous-run count of the list, present only when the
/// base is contiguous.
///
/// # Panics
///
/// If the lists differ in length or no entry has a nonzero blocklength.
pub fn indexed(
    blocklengths: &[u32],
    displacements: &[i64],
    units: Units,
    old: &TypeLayout,
    runs: Option<i64>,
) -> LayoutAttrs {
    assert_eq!(
        blocklengths.len(),
        displacements.len(),
        "blocklength and displacement lists differ in length"
    );

    let block = |blocklength: u32, disp: i64| {
        block_bounds(
            i64::from(blocklength),
            units.to_bytes(disp, old.extent),
            old,
        )
    };

    let mut entries = blocklengths
        .iter()
        .zip(displacements)
        .filter(|&(&blocklength, _)| blocklength != 0);

    let Some((&first_len, &first_disp)) = entries.next() else {
        panic!("indexed datatype has no nonzero blocklength");
    };

    let (bounds, replication) = entries.fold(
        (block(first_len, first_disp), i64::from(first_len)),
        |(bounds, replication), (&blocklength, &disp)| {
            (
                bounds.union(block(blocklength, disp)),
                replication + i64::from(blocklength),
            )
        },
    );

    let mut attrs = replicate(old, bounds, replication);
    attrs.is_contig = runs == Some(1) && attrs.size == attrs.extent;
    attrs
}

/// Index by uniform block: every entry holds `blocklength` instances.
///
/// `runs` is the contiguous-run count of the displacements, present only
/// when the base is contiguous.
///
/// # Panics
///
/// If `displacements` is empty.
pub fn block_indexed(
    blocklength: u32,
    displacements: &[i64],
    units: Units,
    old: &TypeLayout,
    runs: Option<i64>,
) -> LayoutAttrs {
    let Some((&first, rest)) = displacements.split_first() else {
        panic!("block-indexed datatype has no displacements");
    };

    let len = i64::from(blocklength);
    let block = |disp: i64| block_bounds(len, units.to_bytes(disp, old.extent), old);

    let bounds = rest
        .iter()
        .fold(block(first), |bounds, &disp| bounds.union(block(disp)));

    let count = i64::try_from(displacements.len()).unwrap_or(i64::MAX);
    let mut attrs = replicate(old, bounds, count * len);
    attrs.is_contig = runs == Some(1) && attrs.size == attrs.extent;
    attrs
}

/// Override bounds to `[lb, lb + extent)`.
///
/// Payload facts and true bounds are the base's. The result is contiguous
/// only when the new extent equals the payload size and the base was
/// contiguous.
pub fn resized(old: &TypeLayout, lb: i64, extent: i64) -> LayoutAttrs {
    LayoutAttrs {
        size: old.size,
        lb,
        ub: lb + extent,
        true_lb: old.true_lb,
        true_ub: old.true_ub,
        extent,
        alignsize: old.alignsize,
        n_builtin_elements: old.n_builtin_elements,
        builtin_element_size: old.builtin_element_size,
        basic_type: old.basic_type,
        is_contig: extent == old.size && old.is_contig,
    }
}

#[cfg(test)]
mod tests;
