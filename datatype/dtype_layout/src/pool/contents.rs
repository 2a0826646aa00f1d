//! Recorded constructor arguments.
//!
//! Every pooled type remembers the combinator and arguments it was built
//! from, including its base handles. Release walks these to drop base
//! references; inspection and the reference run walker read them back.

use std::fmt;

use crate::{BasicType, TypeId};

/// A constructor's base: a basic element or a pooled derived type.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeRef {
    Basic(BasicType),
    Derived(TypeId),
}

impl TypeRef {
    /// The pooled handle, if this is a derived type.
    #[inline]
    pub const fn derived(self) -> Option<TypeId> {
        match self {
            Self::Basic(_) => None,
            Self::Derived(id) => Some(id),
        }
    }
}

impl From<BasicType> for TypeRef {
    fn from(basic: BasicType) -> Self {
        Self::Basic(basic)
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        Self::Derived(id)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(basic) => write!(f, "{basic:?}"),
            Self::Derived(id) => write!(f, "{id:?}"),
        }
    }
}

/// Combinator and arguments a pooled type was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Contents {
    Vector {
        count: u32,
        blocklength: u32,
        stride: i64,
        base: TypeRef,
    },
    Hvector {
        count: u32,
        blocklength: u32,
        stride: i64,
        base: TypeRef,
    },
    Contiguous {
        count: u32,
        base: TypeRef,
    },
    Dup {
        base: TypeRef,
    },
    Indexed {
        blocklengths: Vec<u32>,
        displacements: Vec<i64>,
        base: TypeRef,
    },
    Hindexed {
        blocklengths: Vec<u32>,
        displacements: Vec<i64>,
        base: TypeRef,
    },
    IndexedBlock {
        blocklength: u32,
        displacements: Vec<i64>,
        base: TypeRef,
    },
    HindexedBlock {
        blocklength: u32,
        displacements: Vec<i64>,
        base: TypeRef,
    },
    Resized {
        lb: i64,
        extent: i64,
        base: TypeRef,
    },
    Struct {
        blocklengths: Vec<u32>,
        displacements: Vec<i64>,
        bases: Vec<TypeRef>,
    },
}

impl Contents {
    /// Combinator name, as used in diagnostics and the definition script.
    pub const fn combiner(&self) -> &'static str {
        match self {
            Self::Vector { .. } => "vector",
            Self::Hvector { .. } => "hvector",
            Self::Contiguous { .. } => "contiguous",
            Self::Dup { .. } => "dup",
            Self::Indexed { .. } => "indexed",
            Self::Hindexed { .. } => "hindexed",
            Self::IndexedBlock { .. } => "indexed_block",
            Self::HindexedBlock { .. } => "hindexed_block",
            Self::Resized { .. } => "resized",
            Self::Struct { .. } => "struct",
        }
    }

    /// Every base, in argument order. Repeats are kept: each occurrence
    /// holds its own reference.
    pub fn bases(&self) -> &[TypeRef] {
        match self {
            Self::Struct { bases, .. } => bases,
            Self::Vector { base, .. }
            | Self::Hvector { base, .. }
            | Self::Contiguous { base, .. }
            | Self::Dup { base }
            | Self::Indexed { base, .. }
            | Self::Hindexed { base, .. }
            | Self::IndexedBlock { base, .. }
            | Self::HindexedBlock { base, .. }
            | Self::Resized { base, .. } => std::slice::from_ref(base),
        }
    }

    /// Handles of the derived bases, one per occurrence.
    pub fn derived_bases(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.bases().iter().copied().filter_map(TypeRef::derived)
    }
}
