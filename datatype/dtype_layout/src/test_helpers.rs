//! Reference byte-run walker.
//!
//! Expands a pooled type into the byte pieces of one instance, in type-map
//! order, by replaying its recorded contents down to basic elements. Slow
//! and exact: the block-count estimator must never report fewer runs than
//! this finds.

use crate::{Contents, TypePool, TypeRef};

/// A `(offset, len)` byte piece of one instance.
pub type Piece = (i64, i64);

/// Every nonempty byte piece of one instance of `base`, in type-map order.
pub fn pieces(pool: &TypePool, base: TypeRef) -> Vec<Piece> {
    let mut out = Vec::new();
    walk(pool, base, 0, &mut out);
    out
}

/// Runs formed by merging pieces that start exactly where the previous one
/// ends.
pub fn count_runs(pieces: &[Piece]) -> i64 {
    let mut runs = 0;
    let mut end = None;
    for &(offset, len) in pieces {
        if end != Some(offset) {
            runs += 1;
        }
        end = Some(offset + len);
    }
    runs
}

fn walk(pool: &TypePool, base: TypeRef, origin: i64, out: &mut Vec<Piece>) {
    let id = match base {
        TypeRef::Basic(basic) => {
            out.push((origin, basic.size()));
            return;
        }
        TypeRef::Derived(id) => id,
    };

    let extent_of = |base: TypeRef| pool.layout_of(base).unwrap().extent;

    match pool.contents(id).unwrap() {
        Contents::Contiguous { count, base } => {
            let extent = extent_of(base);
            for i in 0..i64::from(count) {
                walk(pool, base, origin + i * extent, out);
            }
        }
        Contents::Vector {
            count,
            blocklength,
            stride,
            base,
        } => {
            let extent = extent_of(base);
            strided(pool, base, origin, count, blocklength, stride * extent, out);
        }
        Contents::Hvector {
            count,
            blocklength,
            stride,
            base,
        } => strided(pool, base, origin, count, blocklength, stride, out),
        Contents::Dup { base } | Contents::Resized { base, .. } => walk(pool, base, origin, out),
        Contents::Indexed {
            blocklengths,
            displacements,
            base,
        } => {
            let extent = extent_of(base);
            for (&blocklength, &disp) in blocklengths.iter().zip(&displacements) {
                block(pool, base, origin + disp * extent, blocklength, out);
            }
        }
        Contents::Hindexed {
            blocklengths,
            displacements,
            base,
        } => {
            for (&blocklength, &disp) in blocklengths.iter().zip(&displacements) {
                block(pool, base, origin + disp, blocklength, out);
            }
        }
        Contents::IndexedBlock {
            blocklength,
            displacements,
            base,
        } => {
            let extent = extent_of(base);
            for &disp in &displacements {
                block(pool, base, origin + disp * extent, blocklength, out);
            }
        }
        Contents::HindexedBlock {
            blocklength,
            displacements,
            base,
        } => {
            for &disp in &displacements {
                block(pool, base, origin + disp, blocklength, out);
            }
        }
        Contents::Struct {
            blocklengths,
            displacements,
            bases,
        } => {
            for ((&blocklength, &disp), &base) in
                blocklengths.iter().zip(&displacements).zip(&bases)
            {
                block(pool, base, origin + disp, blocklength, out);
            }
        }
    }
}

fn strided(
    pool: &TypePool,
    base: TypeRef,
    origin: i64,
    count: u32,
    blocklength: u32,
    byte_stride: i64,
    out: &mut Vec<Piece>,
) {
    for i in 0..i64::from(count) {
        block(pool, base, origin + i * byte_stride, blocklength, out);
    }
}

/// `blocklength` consecutive instances of `base` starting at `start`.
fn block(pool: &TypePool, base: TypeRef, start: i64, blocklength: u32, out: &mut Vec<Piece>) {
    let extent = pool.layout_of(base).unwrap().extent;
    for j in 0..i64::from(blocklength) {
        walk(pool, base, start + j * extent, out);
    }
}
