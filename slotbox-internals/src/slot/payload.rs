//! Dual inline/heap storage for a single erased value.
//!
//! This module encapsulates the representation of [`Payload`]. The only way to
//! create a payload is [`Payload::new`], which always picks the representation
//! chosen by [`Placement::of`] for the stored type. This guarantees that a
//! payload holding a `T` is [`Payload::Inline`] exactly when `T` fits the
//! [`InlineBuffer`], and that the pointer in [`Payload::Heap`] always comes
//! from a `Box<T>`.
//!
//! A payload does not know the type it holds and has no destructor. Dropping
//! or cloning the value requires the vtable stored next to it in the
//! [`RawSlot`](crate::RawSlot).

use alloc::boxed::Box;
use core::{cell::UnsafeCell, mem::MaybeUninit, ptr::NonNull};

use crate::{placement::Placement, util::Erased};

/// Word-sized, word-aligned storage for values placed inline.
///
/// The buffer is wrapped in an [`UnsafeCell`] because values with interior
/// mutability may be stored in it and mutated through shared references.
#[repr(transparent)]
pub(crate) struct InlineBuffer(UnsafeCell<MaybeUninit<usize>>);

impl InlineBuffer {
    /// Creates a buffer with uninitialized contents.
    #[inline]
    const fn uninit() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }

    /// Returns a pointer to the start of the buffer.
    #[inline]
    fn as_ptr(&self) -> *mut Erased {
        self.0.get().cast::<Erased>()
    }
}

/// The storage of one erased value.
pub(crate) enum Payload {
    /// The value is stored directly inside the buffer.
    Inline(InlineBuffer),
    /// The value lives in a heap allocation created by [`Box::leak`].
    Heap(NonNull<Erased>),
}

impl Payload {
    /// Stores `value` using the placement chosen for `T`.
    ///
    /// The value is fully moved into its final location before the payload
    /// is returned, so a caller never observes a half-constructed payload.
    #[inline]
    pub(crate) fn new<T: 'static>(value: T) -> Self {
        match const { Placement::of::<T>() } {
            Placement::Inline => {
                let buffer = InlineBuffer::uninit();
                let ptr: *mut T = buffer.as_ptr().cast::<T>();
                // SAFETY: `Placement::of` only chooses `Inline` when `T` is no
                // larger than the buffer and no more strictly aligned than it,
                // so `ptr` is valid and aligned for a write of one `T`.
                unsafe {
                    ptr.write(value);
                }
                Self::Inline(buffer)
            }
            Placement::Heap => {
                let value: &'static mut T = Box::leak(Box::new(value));
                Self::Heap(NonNull::from(value).cast::<Erased>())
            }
        }
    }

    /// Returns how the value is stored.
    #[inline]
    pub(crate) fn placement(&self) -> Placement {
        match self {
            Self::Inline(_) => Placement::Inline,
            Self::Heap(_) => Placement::Heap,
        }
    }

    /// Returns the address of the stored value: the buffer for inline
    /// values, the allocation for heap values.
    ///
    /// Writing through the returned pointer is only allowed while the caller
    /// holds unique access to the payload, or for types with interior
    /// mutability.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut Erased {
        match self {
            Self::Inline(buffer) => buffer.as_ptr(),
            Self::Heap(ptr) => ptr.as_ptr(),
        }
    }

    /// Moves the stored value out of the payload, releasing its allocation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload holds an initialized value of type `T`.
    #[inline]
    pub(crate) unsafe fn into_inner<T: 'static>(self) -> T {
        match self {
            Self::Inline(buffer) => {
                let ptr: *const T = buffer.as_ptr().cast::<T>();
                // SAFETY: The payload holds a `T` (guaranteed by the caller), and
                // it was written into this buffer by `Payload::new`. The buffer is
                // consumed here, so the value is read exactly once.
                unsafe { ptr.read() }
            }
            Self::Heap(ptr) => {
                // SAFETY: The pointer was created from a leaked `Box<T>` in
                // `Payload::new` and the caller guarantees that the type is `T`.
                // The payload is consumed, so the box is reconstructed once.
                let boxed: Box<T> = unsafe { Box::from_raw(ptr.cast::<T>().as_ptr()) };
                *boxed
            }
        }
    }

    /// Drops the stored value in place, releasing its allocation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload holds an initialized value of type `T`.
    #[inline]
    pub(crate) unsafe fn drop_as<T: 'static>(self) {
        match self {
            Self::Inline(buffer) => {
                let ptr: *mut T = buffer.as_ptr().cast::<T>();
                // SAFETY: The payload holds a `T` (guaranteed by the caller) that
                // is properly aligned in the buffer. The buffer is consumed, so
                // the value is dropped exactly once.
                unsafe { core::ptr::drop_in_place(ptr) }
            }
            Self::Heap(ptr) => {
                // SAFETY: The pointer was created from a leaked `Box<T>` in
                // `Payload::new` and the caller guarantees that the type is `T`.
                let boxed: Box<T> = unsafe { Box::from_raw(ptr.cast::<T>().as_ptr()) };
                core::mem::drop(boxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String};
    use core::mem::size_of;

    use super::*;

    #[test]
    fn test_inline_buffer_layout() {
        assert_eq!(size_of::<InlineBuffer>(), crate::INLINE_CAPACITY);
        assert_eq!(core::mem::align_of::<InlineBuffer>(), crate::INLINE_ALIGN);
    }

    #[test]
    fn test_payload_placement_follows_type() {
        let small = Payload::new(7_u32);
        let large = Payload::new(String::from("a string is three words"));

        assert_eq!(small.placement(), Placement::Inline);
        assert_eq!(large.placement(), Placement::Heap);

        // SAFETY: Both payloads were created above with these exact types.
        unsafe { small.drop_as::<u32>() };
        // SAFETY: See above.
        unsafe { large.drop_as::<String>() };
    }

    #[test]
    fn test_payload_into_inner() {
        let small = Payload::new(0xdead_u16);
        let large = Payload::new(String::from("hello"));

        // SAFETY: The payload was created above with this exact type.
        let small: u16 = unsafe { small.into_inner::<u16>() };
        // SAFETY: The payload was created above with this exact type.
        let large: String = unsafe { large.into_inner::<String>() };

        assert_eq!(small, 0xdead);
        assert_eq!(large, "hello");
    }

    #[test]
    fn test_payload_drop_runs_destructor_once() {
        let counter = Rc::new(());
        let inline = Payload::new(Rc::clone(&counter));
        let heap = Payload::new((Rc::clone(&counter), [0_u64; 4]));
        assert_eq!(Rc::strong_count(&counter), 3);

        // SAFETY: The payload was created above with this exact type.
        unsafe { inline.drop_as::<Rc<()>>() };
        assert_eq!(Rc::strong_count(&counter), 2);

        // SAFETY: The payload was created above with this exact type.
        unsafe { heap.drop_as::<(Rc<()>, [u64; 4])>() };
        assert_eq!(Rc::strong_count(&counter), 1);
    }

    #[test]
    fn test_inline_address_is_buffer() {
        let payload = Payload::new(1_u8);
        let Payload::Inline(buffer) = &payload else {
            panic!("u8 must be stored inline");
        };
        assert_eq!(payload.as_ptr(), buffer.as_ptr());

        // SAFETY: The payload was created above with this exact type.
        unsafe { payload.drop_as::<u8>() };
    }
}
