use super::*;

#[test]
fn discriminants_in_expected_ranges() {
    // C character and integer types: 0-15
    assert!((BasicType::Char as u8) < 16);
    assert!((BasicType::CBool as u8) < 16);

    // Floating point and complex: 16-31
    assert!((16..32).contains(&(BasicType::Float as u8)));
    assert!((16..32).contains(&(BasicType::CDoubleComplex as u8)));

    // Fixed-width integers: 32-47
    assert!((32..48).contains(&(BasicType::Int8 as u8)));
    assert!((32..48).contains(&(BasicType::UInt64 as u8)));

    // Address-sized: 48-63
    assert!((48..64).contains(&(BasicType::Aint as u8)));
    assert!((48..64).contains(&(BasicType::Count as u8)));
}

#[test]
fn sizes_match_c_abi() {
    assert_eq!(BasicType::Char.size(), 1);
    assert_eq!(BasicType::Short.size(), 2);
    assert_eq!(BasicType::Int.size(), 4);
    assert_eq!(BasicType::Float.size(), 4);
    assert_eq!(BasicType::Double.size(), 8);
    assert_eq!(BasicType::LongDouble.size(), 16);
    assert_eq!(BasicType::CDoubleComplex.size(), 16);
    assert_eq!(BasicType::Aint.size(), 8);
}

#[test]
fn all_is_in_discriminant_order_without_duplicates() {
    for pair in BasicType::ALL.windows(2) {
        assert!((pair[0] as u8) < (pair[1] as u8), "{pair:?}");
    }
}

#[test]
fn names_round_trip() {
    for basic in BasicType::ALL {
        assert_eq!(BasicType::from_name(basic.name()), Some(basic));
    }
    assert_eq!(BasicType::from_name("quad"), None);
}

#[test]
fn display_and_debug() {
    assert_eq!(format!("{}", BasicType::UInt16), "uint16");
    assert_eq!(format!("{:?}", BasicType::Double), "BasicType::double");
}
