//! Range checks for definitions.
//!
//! The layout engine does its byte arithmetic in plain `i64` and assumes
//! every result fits. Each check here repeats one combinator's sums with
//! checked operations, so that a definition that would leave the `i64`
//! range is rejected before it is built. `None` means some intermediate
//! overflowed.
//!
//! A built layout also serves as a base later, so the checks include the
//! true-bound offsets the engine derives from it then.

use dtype_layout::{TypeLayout, Units};

/// Field of an aggregate, with its base already resolved.
pub(super) struct Field {
    pub blocklength: u32,
    pub displacement: i64,
    pub base: TypeLayout,
}

pub(super) fn vector(
    old: &TypeLayout,
    count: u32,
    blocklength: u32,
    stride: i64,
    units: Units,
) -> Option<()> {
    if count == 0 {
        return Some(());
    }
    let count = i64::from(count);
    let blocklength = i64::from(blocklength);
    let stride = to_bytes(units, stride, old.extent)?;

    // Contiguity and collapse tests.
    blocklength.checked_mul(old.size)?;
    blocklength.checked_mul(old.extent)?;
    old.num_contig_blocks
        .checked_mul(count)?
        .checked_mul(blocklength)?;

    let (lb, ub) = if blocklength == 0 {
        (old.lb, old.lb)
    } else {
        let within = old.extent.checked_mul(blocklength - 1)?;
        let across = stride.checked_mul(count - 1)?;
        match (stride >= 0, old.extent >= 0) {
            (true, true) => (old.lb, old.ub.checked_add(within)?.checked_add(across)?),
            (false, true) => (old.lb.checked_add(across)?, old.ub.checked_add(within)?),
            (true, false) => (old.lb.checked_add(within)?, old.ub.checked_add(across)?),
            (false, false) => (
                old.lb.checked_add(within)?.checked_add(across)?,
                old.ub,
            ),
        }
    };

    replicated(old, lb, ub, count.checked_mul(blocklength)?)
}

pub(super) fn contiguous(old: &TypeLayout, count: u32) -> Option<()> {
    if count == 0 {
        return Some(());
    }
    let count = i64::from(count);
    count.checked_mul(old.num_contig_blocks)?;

    let step = old.extent.checked_mul(count - 1)?;
    let (lb, ub) = if old.ub >= old.lb {
        (old.lb, old.ub.checked_add(step)?)
    } else {
        (old.lb.checked_add(step)?, old.ub)
    };

    replicated(old, lb, ub, count)
}

pub(super) fn indexed(
    old: &TypeLayout,
    blocklengths: &[u32],
    displacements: &[i64],
    units: Units,
) -> Option<()> {
    let mut span: Option<(i64, i64)> = None;
    let mut replication = 0_i64;
    let mut blocks = 0_i64;

    for (&blocklength, &disp) in blocklengths.iter().zip(displacements) {
        let blocklength = i64::from(blocklength);
        blocks = blocks.checked_add(old.num_contig_blocks.checked_mul(blocklength)?)?;
        if blocklength == 0 {
            continue;
        }
        if old.is_contig {
            run_end(units, disp, blocklength, old.extent)?;
        }
        span = Some(widen(span, block(old, blocklength, to_bytes(units, disp, old.extent)?)?));
        replication = replication.checked_add(blocklength)?;
    }

    // A merged run spans at most every block.
    if old.is_contig {
        replication.checked_mul(old.extent)?;
    }

    match span {
        None => Some(()),
        Some((lb, ub)) => replicated(old, lb, ub, replication),
    }
}

pub(super) fn block_indexed(
    old: &TypeLayout,
    blocklength: u32,
    displacements: &[i64],
    units: Units,
) -> Option<()> {
    if displacements.is_empty() {
        return Some(());
    }
    let blocklength = i64::from(blocklength);
    let count = i64::try_from(displacements.len()).ok()?;
    count
        .checked_mul(old.num_contig_blocks)?
        .checked_mul(blocklength)?;

    let mut span: Option<(i64, i64)> = None;
    for &disp in displacements {
        if old.is_contig {
            run_end(units, disp, blocklength, old.extent)?;
        }
        span = Some(widen(span, block(old, blocklength, to_bytes(units, disp, old.extent)?)?));
    }

    let (lb, ub) = span?;
    replicated(old, lb, ub, count.checked_mul(blocklength)?)
}

pub(super) fn resized(old: &TypeLayout, lb: i64, extent: i64) -> Option<()> {
    let ub = lb.checked_add(extent)?;
    old.true_lb.checked_sub(lb)?;
    old.true_ub.checked_sub(ub)?;
    Some(())
}

pub(super) fn aggregate(fields: &[Field]) -> Option<()> {
    let mut span: Option<(i64, i64)> = None;
    let mut true_span: Option<(i64, i64)> = None;
    let mut size = 0_i64;
    let mut elements = 0_i64;
    let mut blocks = 0_i64;
    let mut alignsize = 0_i64;

    for field in fields {
        let old = &field.base;
        let count = i64::from(field.blocklength);
        blocks = blocks.checked_add(old.num_contig_blocks.checked_mul(count)?)?;
        if count == 0 {
            continue;
        }

        let (lb, ub) = block(old, count, field.displacement)?;
        span = Some(widen(span, (lb, ub)));
        true_span = Some(widen(
            true_span,
            (
                lb.checked_add(lower_offset(old)?)?,
                ub.checked_add(upper_offset(old)?)?,
            ),
        ));
        size = size.checked_add(count.checked_mul(old.size)?)?;
        elements = elements.checked_add(count.checked_mul(old.n_builtin_elements)?)?;
        alignsize = alignsize.max(old.alignsize);
    }

    let (Some((lb, ub)), Some((true_lb, true_ub))) = (span, true_span) else {
        return Some(());
    };

    let unpadded = ub.checked_sub(lb)?;
    let padding = match unpadded.rem_euclid(alignsize.max(1)) {
        0 => 0,
        epsilon => alignsize - epsilon,
    };
    let ub = ub.checked_add(padding)?;
    ub.checked_sub(lb)?;
    true_lb.checked_sub(lb)?;
    true_ub.checked_sub(ub)?;
    Some(())
}

/// Payload and bounds of `replication` base copies spanning `[lb, ub)`.
fn replicated(old: &TypeLayout, lb: i64, ub: i64, replication: i64) -> Option<()> {
    replication.checked_mul(old.size)?;
    replication.checked_mul(old.n_builtin_elements)?;
    ub.checked_sub(lb)?;
    lb.checked_add(lower_offset(old)?)?;
    ub.checked_add(upper_offset(old)?)?;
    Some(())
}

/// `[lb, ub)` of `count` base instances starting `disp` bytes in.
fn block(old: &TypeLayout, count: i64, disp: i64) -> Option<(i64, i64)> {
    if count == 0 {
        return Some((old.lb.checked_add(disp)?, old.ub.checked_add(disp)?));
    }
    let within = old.extent.checked_mul(count - 1)?;
    if old.ub >= old.lb {
        Some((
            old.lb.checked_add(disp)?,
            old.ub.checked_add(disp)?.checked_add(within)?,
        ))
    } else {
        Some((
            old.lb.checked_add(disp)?.checked_add(within)?,
            old.ub.checked_add(disp)?,
        ))
    }
}

/// End of a contiguous run that finishes with this block.
fn run_end(units: Units, disp: i64, blocklength: i64, extent: i64) -> Option<i64> {
    match units {
        Units::Elements => disp.checked_add(blocklength),
        Units::Bytes => disp.checked_add(blocklength.checked_mul(extent)?),
    }
}

fn to_bytes(units: Units, value: i64, extent: i64) -> Option<i64> {
    match units {
        Units::Elements => value.checked_mul(extent),
        Units::Bytes => Some(value),
    }
}

fn lower_offset(old: &TypeLayout) -> Option<i64> {
    old.true_lb.checked_sub(old.lb)
}

fn upper_offset(old: &TypeLayout) -> Option<i64> {
    old.true_ub.checked_sub(old.ub)
}

fn widen(span: Option<(i64, i64)>, (lb, ub): (i64, i64)) -> (i64, i64) {
    match span {
        None => (lb, ub),
        Some((low, high)) => (low.min(lb), high.max(ub)),
    }
}
