use super::*;
use crate::BasicType;
use pretty_assertions::assert_eq;

fn int() -> TypeLayout {
    TypeLayout::basic(BasicType::Int)
}

fn assert_extent_identity(attrs: &LayoutAttrs) {
    assert_eq!(attrs.extent, attrs.ub - attrs.lb);
}

// -- Bound rules --

#[test]
fn contig_bounds_zero_count_is_empty_at_lb() {
    let mut old = int();
    old.lb = 4;
    assert_eq!(contig_bounds(0, &old), Bounds { lb: 4, ub: 4 });
}

#[test]
fn contig_bounds_negative_extent_grows_down() {
    let mut old = int();
    old.lb = 4;
    old.ub = 0;
    old.extent = -4;
    assert_eq!(contig_bounds(3, &old), Bounds { lb: -4, ub: 0 });
}

#[test]
fn vector_bounds_covers_all_sign_cases() {
    let old = int();
    assert_eq!(vector_bounds(3, 8, 2, &old), Bounds { lb: 0, ub: 24 });
    assert_eq!(vector_bounds(3, -8, 2, &old), Bounds { lb: -16, ub: 8 });

    let mut neg = int();
    neg.lb = 4;
    neg.ub = 0;
    neg.extent = -4;
    assert_eq!(vector_bounds(2, 8, 2, &neg), Bounds { lb: 0, ub: 8 });
    assert_eq!(vector_bounds(2, -8, 2, &neg), Bounds { lb: -8, ub: 0 });
}

#[test]
fn vector_bounds_empty_blocks() {
    assert_eq!(vector_bounds(3, 8, 0, &int()), Bounds { lb: 0, ub: 0 });
    assert_eq!(vector_bounds(0, 8, 2, &int()), Bounds { lb: 0, ub: 0 });
}

#[test]
fn block_bounds_offsets_by_displacement() {
    assert_eq!(block_bounds(3, 100, &int()), Bounds { lb: 100, ub: 112 });
    assert_eq!(block_bounds(0, 100, &int()), Bounds { lb: 100, ub: 104 });
}

#[test]
fn bounds_union_widens() {
    let a = Bounds { lb: 0, ub: 8 };
    let b = Bounds { lb: -4, ub: 4 };
    assert_eq!(a.union(b), Bounds { lb: -4, ub: 8 });
}

// -- Replicate with stride --

#[test]
fn vector_abutting_blocks_are_contiguous() {
    let attrs = vector(3, 2, 8, Units::Bytes, &int());

    assert_eq!(attrs.size, 24);
    assert_eq!(attrs.extent, 24);
    assert_eq!(attrs.n_builtin_elements, 6);
    assert_eq!(attrs.alignsize, 4);
    assert_eq!(attrs.basic_type, Some(BasicType::Int));
    assert!(attrs.is_contig);
    assert_extent_identity(&attrs);
}

#[test]
fn vector_gapped_blocks_are_not_contiguous() {
    let attrs = vector(3, 2, 16, Units::Bytes, &int());

    assert_eq!(attrs.size, 24);
    assert_eq!(attrs.extent, 40);
    assert!(!attrs.is_contig);
    assert_extent_identity(&attrs);
}

#[test]
fn vector_element_stride_scales_by_extent() {
    let by_elements = vector(3, 2, 4, Units::Elements, &int());
    let by_bytes = vector(3, 2, 16, Units::Bytes, &int());
    assert_eq!(by_elements, by_bytes);
}

#[test]
fn vector_negative_stride() {
    let attrs = vector(3, 1, -8, Units::Bytes, &int());

    assert_eq!((attrs.lb, attrs.ub), (-16, 4));
    assert_eq!((attrs.true_lb, attrs.true_ub), (-16, 4));
    assert_eq!(attrs.size, 12);
    assert!(!attrs.is_contig);
}

#[test]
fn vector_overlapping_blocks_are_not_contiguous() {
    // stride smaller than one block: size exceeds extent
    let attrs = vector(2, 2, 4, Units::Bytes, &int());
    assert_eq!(attrs.size, 16);
    assert_eq!(attrs.extent, 12);
    assert!(!attrs.is_contig);
}

// -- Contiguous --

#[test]
fn contiguous_over_noncontiguous_base() {
    let base = TypeLayout::from_attrs(vector(2, 1, 8, Units::Bytes, &int()), 2);
    let attrs = contiguous(3, &base);

    assert_eq!(attrs.size, 24);
    assert_eq!((attrs.lb, attrs.ub), (0, 36));
    assert_eq!(attrs.n_builtin_elements, 6);
    assert!(!attrs.is_contig);
}

#[test]
fn contiguous_over_basic_is_contiguous() {
    let attrs = contiguous(10, &TypeLayout::basic(BasicType::Char));
    assert_eq!(attrs.size, 10);
    assert_eq!(attrs.extent, 10);
    assert!(attrs.is_contig);
}

// -- Indexed --

#[test]
fn indexed_skips_zero_length_entries() {
    // middle displacement is never read
    let attrs = indexed(&[2, 0, 3], &[0, -1000, 2], Units::Elements, &int(), Some(1));

    assert_eq!(attrs.size, 20);
    assert_eq!((attrs.lb, attrs.ub), (0, 20));
    assert_eq!(attrs.n_builtin_elements, 5);
    assert!(attrs.is_contig);
}

#[test]
fn indexed_leading_zero_entries_do_not_seed_bounds() {
    let attrs = indexed(&[0, 1], &[-100, 5], Units::Bytes, &int(), Some(1));
    assert_eq!((attrs.lb, attrs.ub), (5, 9));
    assert!(attrs.is_contig);
}

#[test]
fn indexed_out_of_order_entries_fold_bounds() {
    let attrs = indexed(&[1, 1], &[16, 0], Units::Bytes, &int(), Some(2));
    assert_eq!((attrs.lb, attrs.ub), (0, 20));
    assert_eq!(attrs.size, 8);
    assert!(!attrs.is_contig);
}

#[test]
fn indexed_needs_single_run_for_contiguity() {
    // one run but size != extent cannot happen for a contiguous base, so
    // the run count alone decides here
    let attrs = indexed(&[1, 1], &[0, 1], Units::Elements, &int(), Some(2));
    assert!(!attrs.is_contig);

    let attrs = indexed(&[1, 1], &[0, 1], Units::Elements, &int(), None);
    assert!(!attrs.is_contig);
}

#[test]
#[should_panic(expected = "no nonzero blocklength")]
fn indexed_all_zero_is_precondition_violation() {
    let _ = indexed(&[0, 0], &[0, 4], Units::Bytes, &int(), None);
}

#[test]
#[should_panic(expected = "differ in length")]
fn indexed_mismatched_lists_is_precondition_violation() {
    let _ = indexed(&[1, 1], &[0], Units::Bytes, &int(), None);
}

// -- Block indexed --

#[test]
fn block_indexed_folds_all_entries() {
    let double = TypeLayout::basic(BasicType::Double);
    let attrs = block_indexed(2, &[0, 2, 6], Units::Elements, &double, Some(2));

    assert_eq!(attrs.size, 48);
    assert_eq!((attrs.lb, attrs.ub), (0, 64));
    assert_eq!(attrs.n_builtin_elements, 6);
    assert!(!attrs.is_contig);
    assert_extent_identity(&attrs);
}

#[test]
fn block_indexed_single_run_is_contiguous() {
    let attrs = block_indexed(2, &[0, 8, 16], Units::Bytes, &int(), Some(1));
    assert_eq!(attrs.extent, 24);
    assert!(attrs.is_contig);
}

// -- Resized --

#[test]
fn resize_keeps_true_bounds() {
    let ten_bytes = TypeLayout::from_attrs(contiguous(10, &TypeLayout::basic(BasicType::Char)), 1);
    let attrs = resized(&ten_bytes, 0, 16);

    assert_eq!(attrs.size, 10);
    assert_eq!((attrs.lb, attrs.ub, attrs.extent), (0, 16, 16));
    assert_eq!((attrs.true_lb, attrs.true_ub), (0, 10));
    assert!(!attrs.is_contig);
}

#[test]
fn resize_to_own_size_stays_contiguous() {
    let attrs = resized(&int(), -4, 4);
    assert_eq!((attrs.lb, attrs.ub), (-4, 0));
    assert!(attrs.is_contig);
}

#[test]
fn replicate_on_top_of_resize_uses_true_bounds() {
    // int padded on both sides: bounds [-4, 8), payload [0, 4)
    let padded = TypeLayout::from_attrs(resized(&int(), -4, 12), 1);
    let attrs = contiguous(2, &padded);

    assert_eq!((attrs.lb, attrs.ub), (-4, 20));
    // payload of the second copy is [12, 16)
    assert_eq!((attrs.true_lb, attrs.true_ub), (0, 16));
    assert_extent_identity(&attrs);
}

#[test]
fn resize_twice_keeps_original_true_bounds() {
    let once = TypeLayout::from_attrs(resized(&int(), -4, 12), 1);
    let twice = resized(&once, 0, 32);

    assert_eq!((twice.true_lb, twice.true_ub), (0, 4));
    assert_eq!((twice.lb, twice.ub), (0, 32));
}
