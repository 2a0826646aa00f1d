//! Bound rules for replicating a base type.
//!
//! Each rule places copies of a base instance and returns the lowest `lb`
//! and highest `ub` the copies span. Bases with a negative extent (possible
//! after a resize) grow downward, so every rule branches on sign.

use crate::TypeLayout;

/// A `[lb, ub)` displacement pair in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub lb: i64,
    pub ub: i64,
}

impl Bounds {
    /// Widen to cover `other` as well.
    #[inline]
    #[must_use]
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            lb: self.lb.min(other.lb),
            ub: self.ub.max(other.ub),
        }
    }
}

/// `count` base instances laid end to end, one extent apart.
pub fn contig_bounds(count: i64, old: &TypeLayout) -> Bounds {
    if count == 0 {
        Bounds {
            lb: old.lb,
            ub: old.lb,
        }
    } else if old.ub >= old.lb {
        Bounds {
            lb: old.lb,
            ub: old.ub + old.extent * (count - 1),
        }
    } else {
        Bounds {
            lb: old.lb + old.extent * (count - 1),
            ub: old.ub,
        }
    }
}

/// `count` blocks of `blocklength` instances, block starts `stride` bytes
/// apart.
pub fn vector_bounds(count: i64, stride: i64, blocklength: i64, old: &TypeLayout) -> Bounds {
    if count == 0 || blocklength == 0 {
        return Bounds {
            lb: old.lb,
            ub: old.lb,
        };
    }

    let within_block = old.extent * (blocklength - 1);
    let across_blocks = stride * (count - 1);

    match (stride >= 0, old.extent >= 0) {
        (true, true) => Bounds {
            lb: old.lb,
            ub: old.ub + within_block + across_blocks,
        },
        (false, true) => Bounds {
            lb: old.lb + across_blocks,
            ub: old.ub + within_block,
        },
        (true, false) => Bounds {
            lb: old.lb + within_block,
            ub: old.ub + across_blocks,
        },
        (false, false) => Bounds {
            lb: old.lb + within_block + across_blocks,
            ub: old.ub,
        },
    }
}

/// One block of `count` instances starting at byte displacement `disp`.
pub fn block_bounds(count: i64, disp: i64, old: &TypeLayout) -> Bounds {
    if count == 0 {
        Bounds {
            lb: old.lb + disp,
            ub: old.ub + disp,
        }
    } else if old.ub >= old.lb {
        Bounds {
            lb: old.lb + disp,
            ub: old.ub + disp + old.extent * (count - 1),
        }
    } else {
        Bounds {
            lb: old.lb + disp + old.extent * (count - 1),
            ub: old.ub + disp,
        }
    }
}
