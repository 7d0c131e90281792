/// Property-based roundtrip tests for the NV codec and store.
///
/// Values go through the same path the store uses: encode into a document,
/// print it, parse it back, decode. A smaller set of cases also exercises the
/// real file cycle.
///
/// Known limitations excluded from exact comparison:
/// - U64/S64 beyond 2^53 (read through f64)
/// - Non-finite floats (stored as `null`, read back as NaN)
use nv_core::{Capacity, Document, NvType, NvValue};
use proptest::prelude::*;

const MAX_EXACT: i64 = 1 << 53;

/// Roundtrip through printed document text.
fn through_document(value: &NvValue) -> NvValue {
    let mut doc = Document::new();
    doc.set("k", value);
    let text = doc.to_pretty_string().expect("print failed");
    Document::parse(&text)
        .expect("parse failed")
        .decode("k", value.kind(), Capacity::Unbounded)
        .expect("decode failed")
}

fn ulp_distance_f32(a: f32, b: f32) -> u32 {
    (a.to_bits() as i64 - b.to_bits() as i64).unsigned_abs() as u32
}

fn ulp_distance_f64(a: f64, b: f64) -> u64 {
    (a.to_bits() as i128 - b.to_bits() as i128).unsigned_abs() as u64
}

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("finite", |v| v.is_finite())
}

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

/// Any exactly-representable value.
fn arb_exact_value() -> impl Strategy<Value = NvValue> {
    prop_oneof![
        any::<u8>().prop_map(NvValue::U8),
        any::<i8>().prop_map(NvValue::S8),
        any::<u16>().prop_map(NvValue::U16),
        any::<i16>().prop_map(NvValue::S16),
        any::<u32>().prop_map(NvValue::U32),
        any::<i32>().prop_map(NvValue::S32),
        (0..=MAX_EXACT as u64).prop_map(NvValue::U64),
        (-MAX_EXACT..=MAX_EXACT).prop_map(NvValue::S64),
        ".{0,40}".prop_map(NvValue::Str),
        prop::collection::vec(".{0,12}", 0..8).prop_map(NvValue::StringArray),
        prop::collection::vec(any::<i32>(), 0..16).prop_map(NvValue::IntArray),
        prop::array::uniform4(any::<u32>()).prop_map(NvValue::Ip),
        prop::array::uniform6(any::<u32>()).prop_map(NvValue::Mac),
    ]
}

proptest! {
    #[test]
    fn exact_values_roundtrip(value in arb_exact_value()) {
        prop_assert_eq!(through_document(&value), value);
    }

    #[test]
    fn float_roundtrips_within_one_ulp(v in finite_f32()) {
        match through_document(&NvValue::Float(v)) {
            NvValue::Float(back) => prop_assert!(ulp_distance_f32(v, back) <= 1, "{} -> {}", v, back),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn double_roundtrips_within_one_ulp(v in finite_f64()) {
        match through_document(&NvValue::Double(v)) {
            NvValue::Double(back) => prop_assert!(ulp_distance_f64(v, back) <= 1, "{} -> {}", v, back),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn float_arrays_keep_length(items in prop::collection::vec(finite_f32(), 0..16)) {
        match through_document(&NvValue::FloatArray(items.clone())) {
            NvValue::FloatArray(back) => {
                prop_assert_eq!(back.len(), items.len());
                for (a, b) in items.iter().zip(&back) {
                    prop_assert!(ulp_distance_f32(*a, *b) <= 1);
                }
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn u8_narrowing_matches_wrapping_cast(n in -100_000i64..100_000) {
        let node = serde_json::json!(n);
        let value = nv_core::codec::decode(&node, NvType::U8, Capacity::Unbounded).unwrap();
        prop_assert_eq!(value, NvValue::U8(n as u8));
    }

    #[test]
    fn ip_text_roundtrips(fields in prop::array::uniform4(any::<u32>())) {
        let text = nv_core::codec::format_ip(&fields);
        prop_assert_eq!(nv_core::codec::parse_ip(&text), fields);
    }

    #[test]
    fn array_capacity_limits_length(
        items in prop::collection::vec(any::<i32>(), 0..16),
        cap in 0usize..20,
    ) {
        let node = nv_core::codec::encode(&NvValue::IntArray(items.clone()));
        let value = nv_core::codec::decode(&node, NvType::IntArray, Capacity::Bounded(cap)).unwrap();
        let expected: Vec<i32> = items.iter().copied().take(cap).collect();
        prop_assert_eq!(value, NvValue::IntArray(expected));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn store_set_then_get(values in prop::collection::vec(arb_exact_value(), 1..6)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nv.json");
        for (i, value) in values.iter().enumerate() {
            nv_core::set(&path, &format!("key{i}"), value).unwrap();
        }
        for (i, value) in values.iter().enumerate() {
            let back = nv_core::get(&path, &format!("key{i}"), value.kind(), Capacity::Unbounded).unwrap();
            prop_assert_eq!(&back, value);
        }
        prop_assert_eq!(nv_core::init(&path).len(), values.len());
    }

    #[test]
    fn array_replacement_never_leaves_stale_elements(
        first in prop::collection::vec(any::<i32>(), 0..16),
        second in prop::collection::vec(any::<i32>(), 0..16),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nv.json");
        nv_core::set(&path, "list", &NvValue::IntArray(first)).unwrap();
        nv_core::set(&path, "list", &NvValue::IntArray(second.clone())).unwrap();
        let back = nv_core::get(&path, "list", NvType::IntArray, Capacity::Unbounded).unwrap();
        prop_assert_eq!(back, NvValue::IntArray(second));
    }
}
