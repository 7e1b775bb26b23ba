//! The type-erased slot.
//!
//! This module encapsulates the `occupied` field of [`RawSlot`], ensuring it
//! is only visible within this module. The field pairs a payload with the
//! vtable that was created for the payload's type, and both are only ever
//! written together. This visibility restriction guarantees the safety
//! invariant: **when a [`RawSlot`] is occupied, its vtable always matches
//! the type of its payload**.
//!
//! # Safety Invariant
//!
//! The invariant is maintained because:
//!
//! - The only places that install a value are [`RawSlot::new`],
//!   [`RawSlot::emplace`] and [`RawSlot::emplace_with`], which take the
//!   vtable from [`VtableFor<T>`] for the same `T` they store.
//! - [`Clone`] copies the vtable together with a payload produced by that
//!   vtable's own clone operation.
//! - Every operation that removes a value removes the vtable along with it.

use core::{any::TypeId, fmt};

use super::{
    payload::Payload,
    vtable::{InvokeVtable, StorageVtable, Vtable, VtableFor},
};
use crate::placement::Placement;

/// The occupied state of a [`RawSlot`].
struct Occupied<V: 'static> {
    /// The vtable for the type of the value in `payload`.
    vtable: &'static V,
    /// The storage of the value.
    payload: Payload,
}

/// A type-erased storage slot that is either empty or owns exactly one value.
///
/// The value is stored inline when its type is word-sized (see
/// [`Placement::of`]) and in a heap allocation otherwise. The vtable kind `V`
/// decides which operations the slot can perform on its value: the default
/// [`StorageVtable`] supports cloning and dropping, and [`InvokeVtable`]
/// additionally supports calling the value.
///
/// A [`RawSlot`] is neither [`Send`] nor [`Sync`], as it cannot know whether
/// the erased value is. Wrappers that restrict the accepted types may
/// implement those traits.
pub struct RawSlot<V: Vtable = StorageVtable> {
    /// The vtable and payload, or `None` if the slot is empty.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. If the field is `Some`, the payload holds an initialized value and
    ///    the vtable is the vtable for the type of that value.
    occupied: Option<Occupied<V>>,
}

impl<V: Vtable> RawSlot<V> {
    /// Creates an empty slot.
    #[inline]
    pub const fn empty() -> Self {
        Self { occupied: None }
    }

    /// Creates a slot holding `value`.
    ///
    /// The value is moved into its final storage before the vtable is
    /// installed.
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: 'static,
        V: VtableFor<T>,
    {
        let payload = Payload::new(value);
        Self {
            occupied: Some(Occupied {
                vtable: V::vtable(),
                payload,
            }),
        }
    }

    /// Returns `true` if the slot holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.occupied.is_some()
    }

    /// Returns `true` if the slot is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied.is_none()
    }

    /// Returns the vtable of the held value, or `None` if the slot is empty.
    #[inline]
    pub fn vtable(&self) -> Option<&'static V> {
        self.occupied.as_ref().map(|occupied| occupied.vtable)
    }

    /// Returns the storage operations of the held value.
    #[inline]
    fn storage(&self) -> Option<&'static StorageVtable> {
        self.vtable().map(|vtable| vtable.storage())
    }

    /// Returns the [`TypeId`] of the held value, or `None` if the slot is
    /// empty.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.storage().map(StorageVtable::type_id)
    }

    /// Returns the [`core::any::type_name`] of the held value, or `None` if
    /// the slot is empty.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        self.storage().map(StorageVtable::type_name)
    }

    /// Returns how the held value is stored, or `None` if the slot is empty.
    #[inline]
    pub fn placement(&self) -> Option<Placement> {
        self.occupied
            .as_ref()
            .map(|occupied| occupied.payload.placement())
    }

    /// Returns the address of the held value, or `None` if the slot is empty.
    ///
    /// For inline values this is an address inside the slot itself, so it is
    /// only stable for as long as the slot is not moved.
    #[inline]
    pub fn as_ptr(&self) -> Option<*const ()> {
        self.occupied
            .as_ref()
            .map(|occupied| occupied.payload.as_ptr().cast_const().cast::<()>())
    }

    /// Returns `true` if the slot holds a value of type `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// Returns a reference to the held value if it has type `T`.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            // SAFETY:
            // 1. The slot holds a value of type `T`, as checked just above.
            Some(unsafe { self.downcast_ref_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the held value if it has type `T`.
    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if self.is::<T>() {
            // SAFETY:
            // 1. The slot holds a value of type `T`, as checked just above.
            Some(unsafe { self.downcast_mut_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a reference to the held value without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The slot holds a value of type `T`.
    #[inline]
    pub unsafe fn downcast_ref_unchecked<T: 'static>(&self) -> &T {
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));

        let ptr: *const T = match &self.occupied {
            Some(occupied) => occupied.payload.as_ptr().cast_const().cast::<T>(),
            None => core::ptr::null(),
        };

        // SAFETY: The caller guarantees the slot holds a `T`, so `ptr` is the
        // non-null address of an initialized `T` that is borrowed for as long
        // as `self` is.
        unsafe { &*ptr }
    }

    /// Returns a mutable reference to the held value without checking its
    /// type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The slot holds a value of type `T`.
    #[inline]
    pub unsafe fn downcast_mut_unchecked<T: 'static>(&mut self) -> &mut T {
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));

        let ptr: *mut T = match &self.occupied {
            Some(occupied) => occupied.payload.as_ptr().cast::<T>(),
            None => core::ptr::null_mut(),
        };

        // SAFETY: The caller guarantees the slot holds a `T`, so `ptr` is the
        // non-null address of an initialized `T`. We hold `&mut self`, so the
        // reference is unique for its lifetime.
        unsafe { &mut *ptr }
    }

    /// Moves the held value out if it has type `T`, leaving the slot empty.
    ///
    /// If the slot is empty or holds another type it is left unchanged and
    /// `None` is returned.
    pub fn take_as<T: 'static>(&mut self) -> Option<T> {
        if !self.is::<T>() {
            return None;
        }

        let occupied = self.occupied.take()?;
        // SAFETY:
        // 1. The payload holds a `T`: the type check above succeeded and the
        //    vtable always matches the payload.
        Some(unsafe { occupied.payload.into_inner::<T>() })
    }

    /// Replaces the held value with `value` and returns a reference to it.
    ///
    /// The previous value is dropped before the new one is installed.
    pub fn emplace<T>(&mut self, value: T) -> &mut T
    where
        T: 'static,
        V: VtableFor<T>,
    {
        self.emplace_with(move || value)
    }

    /// Replaces the held value with the result of `make` and returns a
    /// reference to it.
    ///
    /// The previous value is dropped before `make` runs. If `make` panics the
    /// slot is left empty.
    pub fn emplace_with<T, F>(&mut self, make: F) -> &mut T
    where
        T: 'static,
        V: VtableFor<T>,
        F: FnOnce() -> T,
    {
        self.reset();
        let payload = Payload::new(make());
        self.occupied = Some(Occupied {
            vtable: V::vtable(),
            payload,
        });

        // SAFETY:
        // 1. A `T` was installed just above.
        unsafe { self.downcast_mut_unchecked::<T>() }
    }

    /// Replaces the contents of `dst` with a copy of this slot.
    ///
    /// The copy is made before the old contents of `dst` are dropped, so if
    /// cloning panics `dst` is left unchanged.
    pub fn copy_into(&self, dst: &mut Self) {
        *dst = self.clone();
    }

    /// Moves the held value out into a new slot, leaving this slot empty.
    ///
    /// No clone of the value is made and heap values keep their allocation.
    #[inline]
    pub fn take(&mut self) -> Self {
        Self {
            occupied: self.occupied.take(),
        }
    }

    /// Moves the held value into `dst`, dropping whatever `dst` held before
    /// and leaving this slot empty.
    #[inline]
    pub fn move_into(&mut self, dst: &mut Self) {
        *dst = self.take();
    }

    /// Drops the held value, leaving the slot empty.
    ///
    /// Does nothing if the slot is already empty.
    pub fn reset(&mut self) {
        if let Some(occupied) = self.occupied.take() {
            // SAFETY:
            // 1. The vtable always matches the payload it was stored with.
            unsafe { occupied.vtable.storage().drop_payload(occupied.payload) }
        }
    }

    /// Exchanges the contents of two slots.
    ///
    /// Values are moved, never cloned, and heap values keep their
    /// allocations.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.occupied, &mut other.occupied);
    }
}

impl<A: 'static, R: 'static> RawSlot<InvokeVtable<A, R>> {
    /// Calls the held callable with `args`, or returns `None` if the slot is
    /// empty.
    #[inline]
    pub fn invoke(&self, args: A) -> Option<R> {
        let occupied = self.occupied.as_ref()?;
        // SAFETY:
        // 1. The vtable always matches the payload it was stored with, so the
        //    payload address points to a live value of the callable type the
        //    vtable was created for.
        Some(unsafe { occupied.vtable.invoke(occupied.payload.as_ptr(), args) })
    }
}

impl<V: Vtable> Default for RawSlot<V> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<V: Vtable> Clone for RawSlot<V> {
    fn clone(&self) -> Self {
        let Some(occupied) = &self.occupied else {
            return Self::empty();
        };

        // SAFETY:
        // 1. The vtable always matches the payload it was stored with.
        let payload = unsafe { occupied.vtable.storage().clone_payload(&occupied.payload) };
        Self {
            occupied: Some(Occupied {
                vtable: occupied.vtable,
                payload,
            }),
        }
    }
}

impl<V: Vtable> Drop for RawSlot<V> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<V: Vtable> fmt::Debug for RawSlot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.occupied {
            Some(occupied) => f
                .debug_struct("RawSlot")
                .field("type_name", &occupied.vtable.storage().type_name())
                .field("placement", &occupied.payload.placement())
                .finish(),
            None => f.write_str("RawSlot(<empty>)"),
        }
    }
}
