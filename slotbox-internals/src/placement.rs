//! The inline-versus-heap storage decision.
//!
//! Every erased value is stored in one of two ways: directly inside the
//! word-sized buffer of its slot, or in a separate heap allocation that the
//! slot points to. Which one is used depends only on the type of the value,
//! and is decided at compile time by [`Placement::of`].

use core::mem::{align_of, size_of};

/// Number of bytes a value may occupy and still be stored inline.
///
/// This is the size of one machine word.
pub const INLINE_CAPACITY: usize = size_of::<usize>();

/// Largest alignment a value may require and still be stored inline.
pub const INLINE_ALIGN: usize = align_of::<usize>();

/// Where an erased value lives.
///
/// # Examples
///
/// ```
/// use slotbox_internals::Placement;
///
/// assert_eq!(Placement::of::<u32>(), Placement::Inline);
/// assert_eq!(Placement::of::<[u64; 4]>(), Placement::Heap);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Placement {
    /// The value is stored in the slot's own buffer and never allocates.
    Inline,
    /// The value is stored in a heap allocation owned by the slot.
    Heap,
}

impl Placement {
    /// Returns the placement used for values of type `T`.
    ///
    /// A type is stored inline when it is no larger than [`INLINE_CAPACITY`]
    /// and no more strictly aligned than [`INLINE_ALIGN`]. Moving a value in
    /// Rust is a plain memory copy that cannot fail, so unlike in languages
    /// with user-defined move constructors there is no additional
    /// "cannot throw" requirement.
    #[inline]
    pub const fn of<T>() -> Self {
        if size_of::<T>() <= INLINE_CAPACITY && align_of::<T>() <= INLINE_ALIGN {
            Self::Inline
        } else {
            Self::Heap
        }
    }

    /// Returns `true` if this is [`Placement::Inline`].
    #[inline]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Inline)
    }

    /// Returns `true` if this is [`Placement::Heap`].
    #[inline]
    pub const fn is_heap(self) -> bool {
        matches!(self, Self::Heap)
    }
}
