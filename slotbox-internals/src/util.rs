//! Internal utility types.

/// Marker type used as the pointee of type-erased payload pointers.
///
/// This zero-sized type stands in for the concrete type of a value once it
/// has been erased. A `*const Erased` points at the storage of some value
/// whose actual type is only known to the vtable stored next to it.
///
/// Using a distinct marker type (rather than `()`) makes the intent clearer
/// in signatures and keeps erased pointers from being confused with pointers
/// to real unit values.
pub(crate) struct Erased;
