//! Vtables for type-erased slot operations.
//!
//! This module contains the [`StorageVtable`], which enables cloning and
//! dropping a slot's value after its concrete type `T` has been erased, and
//! the [`InvokeVtable`], which additionally enables calling it. The vtables
//! store function pointers that dispatch to the correct typed
//! implementations.
//!
//! This module encapsulates the fields of both vtables so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual type of the
//! value stored in the [`Payload`]**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`StorageVtable::of`] and [`InvokeVtable::of`], which pair
//! the function pointers with a specific type `T` at compile time, and
//! because the [`VtableFor`] trait that hands them to
//! [`RawSlot::new`](crate::RawSlot::new) is sealed.

use core::any::TypeId;

use crate::{invoke::Invoke, placement::Placement, slot::payload::Payload, util::Erased};

/// Vtable for the storage operations of a type-erased value.
///
/// Contains function pointers for cloning and dropping a value without
/// knowing its concrete type at compile time, together with the identity and
/// placement of that type.
///
/// # Safety Invariant
///
/// The fields `type_id`, `type_name`, `clone` and `drop` are guaranteed to
/// point to the functions below instantiated with the type `T` that was used
/// to create this [`StorageVtable`], and `placement` is `Placement::of::<T>()`.
#[derive(Copy, Clone)]
pub struct StorageVtable {
    /// Gets the [`TypeId`] of the type that was used to create this
    /// [`StorageVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the type that was used to create
    /// this [`StorageVtable`].
    type_name: fn() -> &'static str,
    /// Where values of the type are stored.
    placement: Placement,
    /// Clones the value in the payload into a new payload.
    clone: unsafe fn(&Payload) -> Payload,
    /// Drops the value in the payload.
    drop: unsafe fn(Payload),
}

impl StorageVtable {
    /// Builds the vtable for `T`.
    ///
    /// Kept private to the crate: the only way for other code to obtain a
    /// [`StorageVtable`] is through [`StorageVtable::of`], which returns the
    /// one static instance for `T`.
    pub(crate) const fn new<T: Clone + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>,
            type_name: core::any::type_name::<T>,
            placement: Placement::of::<T>(),
            clone: clone::<T>,
            drop: drop::<T>,
        }
    }

    /// Returns the [`StorageVtable`] for the type `T`.
    ///
    /// Repeated calls with the same `T` return the same static instance.
    #[inline]
    pub fn of<T: Clone + 'static>() -> &'static Self {
        const { &Self::new::<T>() }
    }

    /// Gets the [`TypeId`] of the type that was used to create this
    /// [`StorageVtable`].
    #[inline]
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the type that was used to create
    /// this [`StorageVtable`].
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Gets the [`Placement`] of the type that was used to create this
    /// [`StorageVtable`].
    #[inline]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Clones the value stored in `payload` into a freshly placed payload.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`StorageVtable`] must be the vtable for the type of the value
    ///    stored in `payload`.
    #[inline]
    pub(crate) unsafe fn clone_payload(&self, payload: &Payload) -> Payload {
        // SAFETY: We know that `self.clone` points to the function `clone::<T>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.clone)(payload) }
    }

    /// Drops the value stored in `payload`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`StorageVtable`] must be the vtable for the type of the value
    ///    stored in `payload`.
    #[inline]
    pub(crate) unsafe fn drop_payload(&self, payload: Payload) {
        // SAFETY: We know that `self.drop` points to the function `drop::<T>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.drop)(payload) }
    }
}

/// Vtable for type-erased callables.
///
/// A [`StorageVtable`] for the callable type `F`, extended with an entry that
/// invokes the callable with an argument tuple `A` and returns `R`.
///
/// # Safety Invariant
///
/// `storage` is `StorageVtable::new::<F>()` and `invoke` points to the
/// function `invoke::<F, A, R>` below, for the same `F`.
pub struct InvokeVtable<A: 'static, R: 'static> {
    /// Storage operations for the callable type.
    storage: StorageVtable,
    /// Invokes the callable stored at the given address.
    invoke: unsafe fn(*const Erased, A) -> R,
}

impl<A: 'static, R: 'static> InvokeVtable<A, R> {
    /// Returns the [`InvokeVtable`] for the callable type `F`.
    ///
    /// Repeated calls with the same `F`, `A` and `R` return the same static
    /// instance.
    #[inline]
    pub fn of<F>() -> &'static Self
    where
        F: Invoke<A, Output = R> + Clone + 'static,
    {
        const {
            &Self {
                storage: StorageVtable::new::<F>(),
                invoke: invoke::<F, A, R>,
            }
        }
    }

    /// Returns the storage part of this vtable.
    #[inline]
    pub fn storage(&self) -> &StorageVtable {
        &self.storage
    }

    /// Invokes the callable stored at `ptr` with `args`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to a live, initialized value of the callable type this
    ///    [`InvokeVtable`] was created for.
    #[inline]
    pub(crate) unsafe fn invoke(&self, ptr: *const Erased, args: A) -> R {
        // SAFETY: We know that `self.invoke` points to the function
        // `invoke::<F, A, R>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.invoke)(ptr, args) }
    }
}

mod sealed {
    use super::StorageVtable;

    /// Restricts [`Vtable`](super::Vtable) to the vtables of this crate.
    pub trait Sealed: 'static {
        /// Returns the storage operations of this vtable.
        fn storage(&self) -> &StorageVtable;
    }

    /// Restricts [`VtableFor<T>`](super::VtableFor) to the pairs of vtable
    /// kind and value type that this crate generates vtables for.
    pub trait SealedFor<T>: Sealed {}
}

use sealed::{Sealed, SealedFor};

/// A vtable that can be installed in a [`RawSlot`](crate::RawSlot).
///
/// This trait is sealed and implemented only for [`StorageVtable`] and
/// [`InvokeVtable`].
pub trait Vtable: Sealed {}

/// A vtable kind that has a vtable for values of type `T`.
///
/// This trait is sealed: its implementations are exactly
/// `StorageVtable: VtableFor<T>` for every `T: Clone + 'static`, and
/// `InvokeVtable<A, R>: VtableFor<F>` for every cloneable `F` that can be
/// invoked with `A` and returns `R`. Other crates cannot add implementations,
/// not even for types the blanket implementations leave out:
///
/// ```compile_fail
/// use slotbox_internals::{StorageVtable, VtableFor};
///
/// struct NotClone([u64; 4]);
///
/// impl VtableFor<NotClone> for StorageVtable {
///     fn vtable() -> &'static Self {
///         StorageVtable::of::<u8>()
///     }
/// }
/// ```
pub trait VtableFor<T>: Vtable + SealedFor<T> {
    /// Returns the static vtable for `T`.
    fn vtable() -> &'static Self;
}

impl Sealed for StorageVtable {
    #[inline]
    fn storage(&self) -> &StorageVtable {
        self
    }
}

impl Vtable for StorageVtable {}

impl<T: Clone + 'static> SealedFor<T> for StorageVtable {}

impl<T: Clone + 'static> VtableFor<T> for StorageVtable {
    #[inline]
    fn vtable() -> &'static Self {
        Self::of::<T>()
    }
}

impl<A: 'static, R: 'static> Sealed for InvokeVtable<A, R> {
    #[inline]
    fn storage(&self) -> &StorageVtable {
        &self.storage
    }
}

impl<A: 'static, R: 'static> Vtable for InvokeVtable<A, R> {}

impl<F, A, R> SealedFor<F> for InvokeVtable<A, R>
where
    F: Invoke<A, Output = R> + Clone + 'static,
    A: 'static,
    R: 'static,
{
}

impl<F, A, R> VtableFor<F> for InvokeVtable<A, R>
where
    F: Invoke<A, Output = R> + Clone + 'static,
    A: 'static,
    R: 'static,
{
    #[inline]
    fn vtable() -> &'static Self {
        Self::of::<F>()
    }
}

/// Clones the `T` stored in `payload` into a new payload.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The payload holds an initialized value of type `T`.
unsafe fn clone<T: Clone + 'static>(payload: &Payload) -> Payload {
    let ptr: *const T = payload.as_ptr().cast::<T>();
    // SAFETY: The payload holds an initialized `T` (guaranteed by the caller)
    // and we only create a shared reference for the duration of the clone.
    let value: &T = unsafe { &*ptr };
    Payload::new(value.clone())
}

/// Drops the `T` stored in `payload`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The payload holds an initialized value of type `T`.
unsafe fn drop<T: 'static>(payload: Payload) {
    // SAFETY:
    // 1. Guaranteed by the caller
    unsafe { payload.drop_as::<T>() }
}

/// Invokes the `F` stored at `ptr` with `args`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to a live, initialized value of type `F`.
unsafe fn invoke<F, A, R>(ptr: *const Erased, args: A) -> R
where
    F: Invoke<A, Output = R>,
{
    // SAFETY: Guaranteed by the caller. The callable is only borrowed for the
    // duration of the call.
    let callable: &F = unsafe { &*ptr.cast::<F>() };
    callable.invoke(args)
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn test_vtable_only_for_supported_types() {
        #[allow(dead_code)]
        struct NotClone([u64; 4]);

        static_assertions::assert_impl_all!(StorageVtable: VtableFor<String>, SealedFor<String>);
        static_assertions::assert_not_impl_any!(StorageVtable: VtableFor<NotClone>, SealedFor<NotClone>);
        static_assertions::assert_impl_all!(
            InvokeVtable<(u8,), u8>: VtableFor<fn(u8) -> u8>,
            SealedFor<fn(u8) -> u8>
        );
        static_assertions::assert_not_impl_any!(
            InvokeVtable<(u8,), u16>: VtableFor<fn(u8) -> u8>,
            SealedFor<fn(u8) -> u8>
        );
    }

    #[test]
    fn test_storage_vtable_eq() {
        // Both should be the exact same static instance
        let vtable1 = StorageVtable::of::<i32>();
        let vtable2 = StorageVtable::of::<i32>();
        assert!(core::ptr::eq(vtable1, vtable2));

        let other = StorageVtable::of::<u32>();
        assert!(!core::ptr::eq(vtable1, other));
    }

    #[test]
    fn test_storage_vtable_identity() {
        let vtable = StorageVtable::of::<String>();
        assert_eq!(vtable.type_id(), TypeId::of::<String>());
        assert_eq!(vtable.type_name(), core::any::type_name::<String>());
        assert_eq!(vtable.placement(), Placement::Heap);

        assert_eq!(StorageVtable::of::<u8>().placement(), Placement::Inline);
    }

    #[test]
    fn test_storage_vtable_clone_and_drop() {
        let vtable = StorageVtable::of::<String>();
        let original = Payload::new(String::from("copy me"));

        // SAFETY: The payload holds a `String` and this is the `String` vtable.
        let copy = unsafe { vtable.clone_payload(&original) };
        assert_ne!(original.as_ptr(), copy.as_ptr());

        // SAFETY: The copy was created by the `String` vtable.
        let copy: String = unsafe { copy.into_inner::<String>() };
        assert_eq!(copy, "copy me");

        // SAFETY: The payload holds a `String` and this is the `String` vtable.
        unsafe { vtable.drop_payload(original) };
    }

    #[test]
    fn test_invoke_vtable() {
        fn double(value: i32) -> i32 {
            value * 2
        }

        let vtable = InvokeVtable::<(i32,), i32>::of::<fn(i32) -> i32>();
        assert_eq!(vtable.storage().type_id(), TypeId::of::<fn(i32) -> i32>());
        assert_eq!(vtable.storage().placement(), Placement::Inline);

        let payload = Payload::new(double as fn(i32) -> i32);
        // SAFETY: The payload holds a `fn(i32) -> i32` and this is its vtable.
        let result = unsafe { vtable.invoke(payload.as_ptr(), (21,)) };
        assert_eq!(result, 42);

        // SAFETY: The payload holds a `fn(i32) -> i32` and this is its vtable.
        unsafe { vtable.storage().drop_payload(payload) };
    }

    #[test]
    fn test_invoke_vtable_eq() {
        let vtable1 = InvokeVtable::<(), u8>::of::<fn() -> u8>();
        let vtable2 = <InvokeVtable<(), u8> as VtableFor<fn() -> u8>>::vtable();
        assert!(core::ptr::eq(vtable1, vtable2));
    }
}
