//! Constructor facade.
//!
//! One entry point per type constructor of the message-passing standard.
//! Each resolves its base once (basic or derived), runs the attribute
//! calculator, then the block-count estimator, and returns a fresh
//! [`TypeLayout`]. Nothing is written in place, so a failed call leaves no
//! half-built descriptor behind.
//!
//! Arguments are assumed validated. The only recoverable fault is the
//! scratch reservation in the indexed run scan; the n-dimensional
//! constructors report [`LayoutError::Unsupported`].
//!
//! | Constructor | Stride / displacement unit |
//! |---|---|
//! | [`vector`], [`indexed`], [`indexed_block`] | base extents |
//! | [`hvector`], [`hindexed`], [`hindexed_block`] | bytes |

use std::convert::Infallible;

use crate::{aggregate, attrs, blocks};
use crate::{Base, LayoutAttrs, LayoutError, StructField, TypeLayout, Units};

/// Build the descriptor, checking the invariants every constructor keeps.
fn finish(attrs: LayoutAttrs, num_contig_blocks: i64) -> TypeLayout {
    debug_assert_eq!(attrs.extent, attrs.ub - attrs.lb);
    debug_assert!(!attrs.is_contig || num_contig_blocks == 1);
    debug_assert!(!attrs.is_contig || attrs.size == attrs.extent);
    TypeLayout::from_attrs(attrs, num_contig_blocks)
}

// === Replicate with stride ===

/// `count` blocks of `blocklength` base instances, block starts `stride`
/// base extents apart.
#[tracing::instrument(level = "trace", skip(base))]
pub fn vector(base: Base<'_>, count: u32, blocklength: u32, stride: i64) -> TypeLayout {
    strided(base, count, blocklength, stride, Units::Elements)
}

/// `count` blocks of `blocklength` base instances, block starts `stride`
/// bytes apart.
#[tracing::instrument(level = "trace", skip(base))]
pub fn hvector(base: Base<'_>, count: u32, blocklength: u32, stride: i64) -> TypeLayout {
    strided(base, count, blocklength, stride, Units::Bytes)
}

fn strided(base: Base<'_>, count: u32, blocklength: u32, stride: i64, units: Units) -> TypeLayout {
    if count == 0 {
        return TypeLayout::zero_length();
    }

    let attrs = attrs::vector(count, blocklength, stride, units, &base.layout());
    let num_contig_blocks = blocks::vector(base, count, blocklength, stride, units);
    finish(attrs, num_contig_blocks)
}

/// `count` base instances laid end to end.
#[tracing::instrument(level = "trace", skip(base))]
pub fn contiguous(base: Base<'_>, count: u32) -> TypeLayout {
    if count == 0 {
        return TypeLayout::zero_length();
    }

    let attrs = attrs::contiguous(count, &base.layout());
    let num_contig_blocks = blocks::contiguous(base, count, attrs.is_contig);
    finish(attrs, num_contig_blocks)
}

/// Verbatim copy of the base's layout, block count included.
///
/// A duplicate of a basic element is its synthesized layout. Duplicating a
/// committed representation is the pool's job, see
/// [`TypePool::dup`](crate::TypePool::dup).
pub fn dup(base: Base<'_>) -> TypeLayout {
    base.layout()
}

// === Index by displacement list ===

/// Blocks of `blocklengths[i]` instances at `displacements[i]` base
/// extents.
///
/// # Panics
///
/// If the lists differ in length or every blocklength is zero (with a
/// nonzero count).
#[tracing::instrument(level = "trace", skip_all, fields(count = blocklengths.len()))]
pub fn indexed(
    base: Base<'_>,
    blocklengths: &[u32],
    displacements: &[i64],
) -> Result<TypeLayout, LayoutError> {
    listed(base, blocklengths, displacements, Units::Elements)
}

/// Blocks of `blocklengths[i]` instances at `displacements[i]` bytes.
///
/// # Panics
///
/// As [`indexed`].
#[tracing::instrument(level = "trace", skip_all, fields(count = blocklengths.len()))]
pub fn hindexed(
    base: Base<'_>,
    blocklengths: &[u32],
    displacements: &[i64],
) -> Result<TypeLayout, LayoutError> {
    listed(base, blocklengths, displacements, Units::Bytes)
}

fn listed(
    base: Base<'_>,
    blocklengths: &[u32],
    displacements: &[i64],
    units: Units,
) -> Result<TypeLayout, LayoutError> {
    if blocklengths.is_empty() {
        return Ok(TypeLayout::zero_length());
    }

    let old = base.layout();
    let runs = if old.is_contig {
        Some(blocks::indexed_runs(
            blocklengths,
            displacements,
            units,
            old.extent,
        )?)
    } else {
        None
    };

    let attrs = attrs::indexed(blocklengths, displacements, units, &old, runs);
    let num_contig_blocks = blocks::indexed(base, blocklengths, runs);
    Ok(finish(attrs, num_contig_blocks))
}

// === Index by uniform block ===

/// Blocks of `blocklength` instances at `displacements[i]` base extents.
#[tracing::instrument(level = "trace", skip_all, fields(count = displacements.len(), blocklength))]
pub fn indexed_block(base: Base<'_>, blocklength: u32, displacements: &[i64]) -> TypeLayout {
    uniform_blocks(base, blocklength, displacements, Units::Elements)
}

/// Blocks of `blocklength` instances at `displacements[i]` bytes.
#[tracing::instrument(level = "trace", skip_all, fields(count = displacements.len(), blocklength))]
pub fn hindexed_block(base: Base<'_>, blocklength: u32, displacements: &[i64]) -> TypeLayout {
    uniform_blocks(base, blocklength, displacements, Units::Bytes)
}

fn uniform_blocks(
    base: Base<'_>,
    blocklength: u32,
    displacements: &[i64],
    units: Units,
) -> TypeLayout {
    if displacements.is_empty() {
        return TypeLayout::zero_length();
    }

    let old = base.layout();
    let runs = old
        .is_contig
        .then(|| blocks::block_indexed_runs(blocklength, displacements, units, old.extent));

    let attrs = attrs::block_indexed(blocklength, displacements, units, &old, runs);
    let num_contig_blocks = blocks::block_indexed(base, displacements.len(), blocklength, runs);
    finish(attrs, num_contig_blocks)
}

// === Bound override ===

/// Override the bounds to `[lb, lb + extent)`, keeping payload and true
/// bounds.
#[tracing::instrument(level = "trace", skip(base))]
pub fn resized(base: Base<'_>, lb: i64, extent: i64) -> TypeLayout {
    let attrs = attrs::resized(&base.layout(), lb, extent);
    let num_contig_blocks = blocks::resized(base, attrs.is_contig);
    finish(attrs, num_contig_blocks)
}

// === Heterogeneous aggregate ===

/// Struct-like aggregate of fields with independent bases.
#[tracing::instrument(level = "trace", skip_all, fields(count = fields.len()))]
pub fn struct_type(fields: &[StructField<'_>]) -> TypeLayout {
    let Some(mut attrs) = aggregate::fold(fields) else {
        return TypeLayout::zero_length();
    };

    let num_contig_blocks = blocks::aggregate(fields);
    attrs.is_contig &= num_contig_blocks == 1;
    finish(attrs, num_contig_blocks)
}

// === N-dimensional arrays ===

/// Storage order of an n-dimensional array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayOrder {
    /// Row-major.
    C,
    /// Column-major.
    Fortran,
}

/// Distribution of one dimension across a process grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Distribution {
    Block,
    Cyclic,
    None,
}

/// Parameters of a rectangular subarray.
#[derive(Clone, Debug)]
pub struct SubarrayParams<'a> {
    pub sizes: &'a [u32],
    pub subsizes: &'a [u32],
    pub starts: &'a [u32],
    pub order: ArrayOrder,
}

/// Parameters of a block/cyclic distributed array.
#[derive(Clone, Debug)]
pub struct DarrayParams<'a> {
    pub size: u32,
    pub rank: u32,
    pub gsizes: &'a [u32],
    pub distribs: &'a [Distribution],
    pub dargs: &'a [i64],
    pub psizes: &'a [u32],
    pub order: ArrayOrder,
}

/// Rectangular subarray. No layout rule exists at this layer, so this
/// never succeeds.
#[tracing::instrument(level = "trace", skip_all, fields(ndims = params.sizes.len()))]
pub fn subarray(_base: Base<'_>, params: &SubarrayParams<'_>) -> Result<Infallible, LayoutError> {
    Err(LayoutError::Unsupported {
        combiner: "subarray",
    })
}

/// Distributed array. No layout rule exists at this layer, so this never
/// succeeds.
#[tracing::instrument(level = "trace", skip_all, fields(ndims = params.gsizes.len()))]
pub fn darray(_base: Base<'_>, params: &DarrayParams<'_>) -> Result<Infallible, LayoutError> {
    Err(LayoutError::Unsupported { combiner: "darray" })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
