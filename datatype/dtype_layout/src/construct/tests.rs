use super::*;
use crate::BasicType;
use pretty_assertions::assert_eq;

const INT: Base<'static> = Base::Basic(BasicType::Int);

fn assert_invariants(layout: &TypeLayout) {
    assert_eq!(layout.extent, layout.ub - layout.lb, "{layout:?}");
    assert!(layout.num_contig_blocks >= 1, "{layout:?}");
    if layout.is_contig {
        assert_eq!(layout.num_contig_blocks, 1, "{layout:?}");
        assert_eq!(layout.size, layout.extent, "{layout:?}");
    }
}

// -- Reference scenarios --

#[test]
fn hvector_abutting_blocks_is_one_run() {
    let layout = hvector(INT, 3, 2, 8);

    assert_eq!(layout.size, 24);
    assert_eq!(layout.extent, 24);
    assert!(layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 1);
    assert_invariants(&layout);
}

#[test]
fn hvector_gapped_blocks() {
    let layout = hvector(INT, 3, 2, 16);

    assert_eq!(layout.size, 24);
    assert_eq!(layout.extent, 40);
    assert!(!layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 3);
    assert_invariants(&layout);
}

#[test]
fn indexed_skips_zero_length_entry() {
    let layout = indexed(INT, &[2, 0, 3], &[0, 7, 2]).unwrap();

    assert_eq!(layout.size, 20);
    assert_eq!((layout.lb, layout.ub), (0, 20));
    assert!(layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 1);
    assert_invariants(&layout);
}

#[test]
fn resize_contiguous_ten_bytes_to_sixteen() {
    let ten = contiguous(Base::Basic(BasicType::Char), 10);
    assert!(ten.is_contig);

    let layout = resized(Base::Derived(&ten), 0, 16);

    assert_eq!(layout.extent, 16);
    assert!(!layout.is_contig);
    assert_eq!((layout.true_lb, layout.true_ub), (ten.true_lb, ten.true_ub));
    assert_eq!(layout.num_contig_blocks, ten.num_contig_blocks);
    assert_invariants(&layout);
}

#[test]
fn dup_reproduces_every_field() {
    let base = hvector(INT, 3, 2, 16);
    let copy = dup(Base::Derived(&base));
    assert_eq!(copy, base);
}

// -- Replicate with stride --

#[test]
fn vector_stride_counts_base_extents() {
    let layout = vector(Base::Basic(BasicType::Double), 4, 1, 2);

    assert_eq!(layout.size, 32);
    assert_eq!((layout.lb, layout.ub), (0, 56));
    assert_eq!(layout.num_contig_blocks, 4);
    assert_eq!(layout.alignsize, 8);
    assert_invariants(&layout);
}

#[test]
fn vector_of_vector_multiplies_blocks() {
    let inner = hvector(INT, 2, 1, 8);
    let outer = vector(Base::Derived(&inner), 3, 2, 4);

    assert_eq!(inner.num_contig_blocks, 2);
    assert_eq!(outer.num_contig_blocks, 12);
    assert_eq!(outer.n_builtin_elements, 12);
    assert_eq!(outer.basic_type, Some(BasicType::Int));
    assert_invariants(&outer);
}

#[test]
fn vector_of_contiguous_base_collapses() {
    let inner = contiguous(INT, 4);
    let outer = vector(Base::Derived(&inner), 5, 3, 3);

    assert!(outer.is_contig);
    assert_eq!(outer.num_contig_blocks, 1);
    assert_eq!(outer.size, 240);
    assert_invariants(&outer);
}

#[test]
fn zero_count_yields_zero_length_layout() {
    assert_eq!(vector(INT, 0, 4, 8), TypeLayout::zero_length());
    assert_eq!(hvector(INT, 0, 4, 8), TypeLayout::zero_length());
    assert_eq!(contiguous(INT, 0), TypeLayout::zero_length());
    assert_eq!(indexed(INT, &[], &[]).unwrap(), TypeLayout::zero_length());
    assert_eq!(hindexed_block(INT, 2, &[]), TypeLayout::zero_length());
    assert_eq!(struct_type(&[]), TypeLayout::zero_length());
}

// -- Contiguous --

#[test]
fn contiguous_over_basic() {
    let layout = contiguous(INT, 6);

    assert_eq!(layout.size, 24);
    assert_eq!((layout.lb, layout.ub), (0, 24));
    assert_eq!(layout.n_builtin_elements, 6);
    assert!(layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 1);
}

#[test]
fn contiguous_over_gapped_base() {
    let inner = hvector(INT, 2, 1, 8);
    let layout = contiguous(Base::Derived(&inner), 3);

    assert!(!layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 6);
    assert_invariants(&layout);
}

// -- Indexed --

#[test]
fn hindexed_byte_displacements() {
    let layout = hindexed(INT, &[1, 2], &[0, 8]).unwrap();

    assert_eq!(layout.size, 12);
    assert_eq!((layout.lb, layout.ub), (0, 16));
    assert!(!layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 2);
    assert_invariants(&layout);
}

#[test]
fn indexed_over_gapped_base_sums_blocklengths() {
    let inner = hvector(INT, 2, 1, 8);
    let layout = indexed(Base::Derived(&inner), &[1, 0, 3], &[0, 0, 1]).unwrap();

    assert_eq!(layout.num_contig_blocks, 8);
    assert_eq!(layout.size, 32);
    assert_invariants(&layout);
}

#[test]
fn indexed_scan_tightens_basic_count() {
    // three entries, two of which merge
    let layout = indexed(INT, &[1, 1, 1], &[0, 1, 5]).unwrap();
    assert_eq!(layout.num_contig_blocks, 2);
    assert!(!layout.is_contig);
}

#[test]
#[should_panic(expected = "no nonzero blocklength")]
fn indexed_all_zero_blocklengths_panics() {
    let _ = indexed(INT, &[0, 0], &[0, 1]);
}

// -- Index by uniform block --

#[test]
fn indexed_block_runs() {
    let layout = indexed_block(INT, 2, &[0, 2, 4]);
    assert!(layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 1);
    assert_eq!(layout.size, 24);

    let layout = indexed_block(INT, 2, &[0, 4, 8]);
    assert!(!layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 3);
    assert_eq!(layout.extent, 40);
    assert_invariants(&layout);
}

#[test]
fn hindexed_block_over_gapped_base() {
    let inner = hvector(INT, 2, 1, 8);
    let layout = hindexed_block(Base::Derived(&inner), 2, &[0, 100]);

    assert_eq!(layout.num_contig_blocks, 8);
    assert_eq!(layout.size, 32);
    assert_invariants(&layout);
}

// -- Resized --

#[test]
fn resized_basic_padding_is_three_blocks() {
    let layout = resized(INT, -4, 12);

    assert_eq!((layout.lb, layout.ub), (-4, 8));
    assert_eq!((layout.true_lb, layout.true_ub), (0, 4));
    assert_eq!(layout.size, 4);
    assert!(!layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 3);
    assert_invariants(&layout);
}

#[test]
fn resized_basic_to_own_extent_is_one_block() {
    let layout = resized(INT, 0, 4);
    assert!(layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 1);
}

#[test]
fn replicate_on_resized_base_uses_true_bounds() {
    let padded = resized(INT, -4, 12);
    let pair = contiguous(Base::Derived(&padded), 2);

    assert_eq!((pair.lb, pair.ub), (-4, 20));
    assert_eq!((pair.true_lb, pair.true_ub), (0, 16));
    assert_eq!(pair.num_contig_blocks, 6);

    let again = resized(Base::Derived(&pair), 0, 64);
    assert_eq!((again.true_lb, again.true_ub), (0, 16));
    assert_invariants(&again);
}

// -- Struct --

#[test]
fn struct_type_counts_blocks_per_field() {
    let inner = hvector(INT, 2, 1, 8);
    let fields = [
        StructField {
            blocklength: 3,
            displacement: 0,
            base: INT,
        },
        StructField {
            blocklength: 2,
            displacement: 16,
            base: Base::Derived(&inner),
        },
    ];
    let layout = struct_type(&fields);

    assert_eq!(layout.num_contig_blocks, 1 + 4);
    assert_eq!(layout.size, 12 + 16);
    assert_eq!(layout.basic_type, Some(BasicType::Int));
    assert!(!layout.is_contig);
    assert_invariants(&layout);
}

#[test]
fn struct_type_never_collapses_multiple_fields() {
    let fields = [
        StructField {
            blocklength: 1,
            displacement: 0,
            base: INT,
        },
        StructField {
            blocklength: 1,
            displacement: 4,
            base: INT,
        },
    ];
    let layout = struct_type(&fields);

    assert_eq!(layout.size, layout.extent);
    assert_eq!(layout.num_contig_blocks, 2);
    assert!(!layout.is_contig);
}

#[test]
fn struct_type_single_basic_field_is_contiguous() {
    let layout = struct_type(&[StructField {
        blocklength: 4,
        displacement: 0,
        base: INT,
    }]);
    assert!(layout.is_contig);
    assert_eq!(layout.num_contig_blocks, 1);
}

// -- N-dimensional --

#[test]
fn subarray_and_darray_are_unsupported() {
    let sizes = [4, 4];
    let params = SubarrayParams {
        sizes: &sizes,
        subsizes: &[2, 2],
        starts: &[1, 1],
        order: ArrayOrder::C,
    };
    assert_eq!(
        subarray(INT, &params),
        Err(LayoutError::Unsupported {
            combiner: "subarray"
        })
    );

    let params = DarrayParams {
        size: 4,
        rank: 0,
        gsizes: &sizes,
        distribs: &[Distribution::Block, Distribution::Cyclic],
        dargs: &[-1, -1],
        psizes: &[2, 2],
        order: ArrayOrder::Fortran,
    };
    assert_eq!(
        darray(INT, &params),
        Err(LayoutError::Unsupported { combiner: "darray" })
    );
}
