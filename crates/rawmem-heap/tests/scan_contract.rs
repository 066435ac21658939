//! The layout/scan contract, exercised end to end.
//!
//! Unboxed types are embedded in records through the placer interface and
//! the scanner must only ever report reference slots.

use std::sync::Arc;

use proptest::prelude::*;
use rawmem_core::{InlineLayout, InlinePlacer, Platform};
use rawmem_decl::SizeMode;
use rawmem_heap::{HeapConfig, ObjectScanner, RecordHeap, RecordLayout, RecordLayoutBuilder};
use rawmem_test_utils::fixtures::{bit_vector, byte_range, native_registry, platforms, unboxed};
use rawmem_test_utils::{RecordingPlacer, RecordingVisitor};

#[test]
fn native_types_place_at_word_alignment() {
    for platform in platforms() {
        let (registry, natives) = native_registry(platform);
        let mut placer = RecordingPlacer::new();
        let tag = byte_range(1, platform);
        placer.place_inline("tag", &*tag).unwrap();
        let address = registry.get(natives.address).unwrap();
        let offset = placer.place_inline("addr", &**address).unwrap();
        assert_eq!(offset, platform.word_size().max(1));
        assert_eq!(placer.used(), offset + platform.word_size());
    }
}

#[test]
fn placer_reserves_required_byte_size() {
    let platform = Platform::WORD_64;
    let bits = bit_vector(130, platform);
    let mut placer = RecordingPlacer::new();
    placer.place_inline("bits", &*bits).unwrap();
    let placement = &placer.placements()[0];
    assert_eq!(placement.size, bits.required_byte_size());
    assert_eq!(placement.size, 24);
    assert_eq!(placement.align, 8);
}

#[test]
fn scanner_never_reports_inline_address_words() {
    let platform = Platform::WORD_64;
    let (registry, natives) = native_registry(platform);
    let address = Arc::clone(registry.get(natives.address).unwrap());
    let layout = Arc::new(
        RecordLayoutBuilder::new("Frame", platform)
            .inline("return_address", Arc::clone(&address))
            .unwrap()
            .reference("caller")
            .unwrap()
            .inline("frame_pointer", address)
            .unwrap()
            .build()
            .unwrap(),
    );
    let mut heap = RecordHeap::new(HeapConfig::new(), platform).unwrap();
    let callee = heap.alloc(&layout).unwrap();
    let caller = heap.alloc(&layout).unwrap();
    heap.set_reference(callee, "caller", Some(caller)).unwrap();
    heap.raw_mut(callee, "return_address")
        .unwrap()
        .copy_from_slice(&callee.raw().to_le_bytes());

    let mut visitor = RecordingVisitor::new();
    ObjectScanner::new(&heap)
        .scan_object(callee, &mut visitor)
        .unwrap();
    assert_eq!(visitor.visits(), &[(8, caller.raw())]);
}

fn arb_slots() -> impl Strategy<Value = Vec<Option<Vec<(bool, i64)>>>> {
    // `None` is a reference slot; `Some(fields)` an inline unboxed type.
    prop::collection::vec(
        prop::option::of(prop::collection::vec((any::<bool>(), 0i64..6), 0..4)),
        0..10,
    )
}

fn build_layout(slots: &[Option<Vec<(bool, i64)>>], platform: Platform) -> RecordLayout {
    let mut builder = RecordLayoutBuilder::new("R", platform);
    for (i, slot) in slots.iter().enumerate() {
        let name = format!("s{i}");
        match slot {
            None => {
                builder.add_reference(&name).unwrap();
            }
            Some(fields) => {
                let fields: Vec<(SizeMode, i64)> = fields
                    .iter()
                    .map(|&(words, len)| (SizeMode::from_words_flag(words), len))
                    .collect();
                builder
                    .add_inline(&name, unboxed(&name, &fields, platform))
                    .unwrap();
            }
        }
    }
    builder.build().unwrap()
}

proptest! {
    #[test]
    fn scan_map_and_opaque_ranges_are_disjoint(slots in arb_slots()) {
        for platform in [Platform::WORD_32, Platform::WORD_64] {
            let layout = build_layout(&slots, platform);
            for &offset in layout.reference_offsets() {
                for byte in offset..offset + platform.word_size() {
                    prop_assert!(!layout.is_opaque_at(byte));
                }
            }
            for range in layout.opaque_ranges() {
                prop_assert!(range.end <= layout.size());
            }
            prop_assert_eq!(layout.size() % layout.alignment(), 0);
        }
    }

    #[test]
    fn scanner_reports_exactly_the_reference_slots(slots in arb_slots()) {
        let platform = Platform::WORD_64;
        let layout = Arc::new(build_layout(&slots, platform));
        let mut heap = RecordHeap::new(HeapConfig::new(), platform).unwrap();
        let obj = heap.alloc(&layout).unwrap();
        let opaque: Vec<String> = layout
            .slots()
            .filter(|(_, s)| s.kind.is_opaque())
            .map(|(name, _)| name.to_string())
            .collect();
        for name in &opaque {
            heap.raw_mut(obj, name).unwrap().fill(0xA5);
        }
        let mut visitor = RecordingVisitor::new();
        let visited = ObjectScanner::new(&heap).scan_object(obj, &mut visitor).unwrap();
        prop_assert_eq!(visited, layout.reference_offsets().len());
        prop_assert_eq!(visitor.offsets(), layout.reference_offsets().to_vec());
        prop_assert!(visitor.visits().iter().all(|&(_, raw)| raw == 0));
    }
}
