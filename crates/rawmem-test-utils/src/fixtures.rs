//! Reusable unboxed type fixtures.
//!
//! - [`native_registry`] — a registry pre-loaded with `Word`, `Address`,
//!   `Offset` and `Extent`.
//! - [`byte_range`] / [`bit_vector`] — single-field raw types of a given
//!   size, the other common native-width building blocks.
//! - [`unboxed`] — compose an ad-hoc type from `(mode, length)` pairs.

use std::sync::Arc;

use rawmem_core::Platform;
use rawmem_decl::{
    compose_type, declare, DeclConfig, DeclaredField, NativeWidthTypes, SizeMode, TypeRegistry,
    UnboxedType,
};

/// Every supported word size, smallest first.
pub fn platforms() -> [Platform; 4] {
    [1, 2, 4, 8].map(|w| Platform::new(w).expect("supported word size"))
}

/// A registry for `platform` holding the canonical one-word types.
pub fn native_registry(platform: Platform) -> (TypeRegistry, NativeWidthTypes) {
    let mut registry = TypeRegistry::new(DeclConfig::new(platform));
    let natives = NativeWidthTypes::define(&mut registry).expect("fresh registry");
    (registry, natives)
}

/// A raw field of `length` units of `mode`.
pub fn raw_field(name: &str, mode: SizeMode, length: i64, platform: Platform) -> DeclaredField {
    DeclaredField::raw(name, declare(mode, length, platform).expect("valid raw spec"))
}

/// Compose a type whose fields are named `f0`, `f1`, ... in order.
pub fn unboxed(name: &str, fields: &[(SizeMode, i64)], platform: Platform) -> Arc<UnboxedType> {
    let declared: Vec<DeclaredField> = fields
        .iter()
        .enumerate()
        .map(|(i, &(mode, len))| raw_field(&format!("f{i}"), mode, len, platform))
        .collect();
    Arc::new(compose_type(name, declared, &DeclConfig::new(platform)).expect("raw-only composition"))
}

/// A byte range of `len` bytes.
pub fn byte_range(len: i64, platform: Platform) -> Arc<UnboxedType> {
    unboxed(&format!("Bytes{len}"), &[(SizeMode::Bytes, len)], platform)
}

/// A bit vector of at least `bits` bits, rounded up to whole words.
pub fn bit_vector(bits: u64, platform: Platform) -> Arc<UnboxedType> {
    let word_bits = platform.word_size() * 8;
    let words = bits.div_ceil(word_bits) as i64;
    unboxed(&format!("Bits{bits}"), &[(SizeMode::Words, words)], platform)
}
