//! Layout descriptor for a single instance of a datatype.
//!
//! [`TypeLayout`] is the record every constructor produces. It is a plain
//! `Copy` value: once built it never changes, and derived constructors only
//! read it through [`Base`].
//!
//! # Bounds
//!
//! Two pairs of bounds are tracked:
//! - `lb`/`ub`: the bounds an array of this type is strided by. A resize
//!   overrides them ("sticky" bounds).
//! - `true_lb`/`true_ub`: where the payload actually lies. A resize never
//!   touches them, so composition on top of a resized type can still find
//!   its data.
//!
//! `extent == ub - lb` holds for every descriptor.

use crate::BasicType;

/// Layout facts for one instance of a datatype.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeLayout {
    /// Payload bytes, excluding gaps.
    pub size: i64,
    pub lb: i64,
    pub ub: i64,
    pub true_lb: i64,
    pub true_ub: i64,
    /// Stride of an array of this type, always `ub - lb`.
    pub extent: i64,
    pub alignsize: i64,
    /// Total basic elements across all replication.
    pub n_builtin_elements: i64,
    /// Size of the uniform basic element, `None` for heterogeneous types.
    pub builtin_element_size: Option<i64>,
    /// The uniform basic element, `None` for heterogeneous types.
    pub basic_type: Option<BasicType>,
    /// One gap-free run covering exactly `[lb, ub)`.
    pub is_contig: bool,
    /// Upper bound on the contiguous runs in one instance (exact when
    /// `is_contig`).
    pub num_contig_blocks: i64,
}

impl TypeLayout {
    /// Synthesized layout of a basic element.
    pub const fn basic(basic: BasicType) -> Self {
        let size = basic.size();
        Self {
            size,
            lb: 0,
            ub: size,
            true_lb: 0,
            true_ub: size,
            extent: size,
            alignsize: size,
            n_builtin_elements: 1,
            builtin_element_size: Some(size),
            basic_type: Some(basic),
            is_contig: true,
            num_contig_blocks: 1,
        }
    }

    /// Layout of a type with no payload (a combinator applied zero times).
    ///
    /// It has no uniform element. Counted as one empty run so that
    /// `num_contig_blocks >= 1` holds.
    pub const fn zero_length() -> Self {
        Self {
            size: 0,
            lb: 0,
            ub: 0,
            true_lb: 0,
            true_ub: 0,
            extent: 0,
            alignsize: 0,
            n_builtin_elements: 0,
            builtin_element_size: None,
            basic_type: None,
            is_contig: true,
            num_contig_blocks: 1,
        }
    }

    /// Assemble a descriptor from calculated attributes and a block count.
    pub fn from_attrs(attrs: LayoutAttrs, num_contig_blocks: i64) -> Self {
        Self {
            size: attrs.size,
            lb: attrs.lb,
            ub: attrs.ub,
            true_lb: attrs.true_lb,
            true_ub: attrs.true_ub,
            extent: attrs.extent,
            alignsize: attrs.alignsize,
            n_builtin_elements: attrs.n_builtin_elements,
            builtin_element_size: attrs.builtin_element_size,
            basic_type: attrs.basic_type,
            is_contig: attrs.is_contig,
            num_contig_blocks,
        }
    }

    /// Offset of the payload start from the lower bound.
    #[inline]
    pub const fn true_lb_offset(&self) -> i64 {
        self.true_lb - self.lb
    }

    /// Offset of the payload end from the upper bound.
    #[inline]
    pub const fn true_ub_offset(&self) -> i64 {
        self.true_ub - self.ub
    }
}

/// Output of the attribute calculator: a [`TypeLayout`] without its block
/// count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutAttrs {
    pub size: i64,
    pub lb: i64,
    pub ub: i64,
    pub true_lb: i64,
    pub true_ub: i64,
    pub extent: i64,
    pub alignsize: i64,
    pub n_builtin_elements: i64,
    pub builtin_element_size: Option<i64>,
    pub basic_type: Option<BasicType>,
    pub is_contig: bool,
}

/// The base of a combinator, resolved once at the top of each constructor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Base<'a> {
    Basic(BasicType),
    Derived(&'a TypeLayout),
}

impl Base<'_> {
    /// The base's layout facts, synthesized for a basic element.
    #[inline]
    pub fn layout(self) -> TypeLayout {
        match self {
            Base::Basic(basic) => TypeLayout::basic(basic),
            Base::Derived(layout) => *layout,
        }
    }
}

/// One field of a heterogeneous aggregate: `blocklength` instances of
/// `base` starting at byte `displacement`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StructField<'a> {
    pub blocklength: u32,
    pub displacement: i64,
    pub base: Base<'a>,
}

/// Unit of a stride or displacement parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Units {
    /// Multiples of the base type's extent.
    Elements,
    /// Literal bytes.
    Bytes,
}

impl Units {
    /// Convert a stride or displacement to bytes.
    ///
    /// Element units scale by the base's extent, not its size.
    #[inline]
    pub const fn to_bytes(self, value: i64, base_extent: i64) -> i64 {
        match self {
            Units::Elements => value * base_extent,
            Units::Bytes => value,
        }
    }
}
