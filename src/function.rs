use core::{any::type_name, fmt};

use slotbox_internals::{InvokeVtable, Placement, RawSlot, invoke::Invoke};

use crate::{
    BadCall, TypeInfo,
    markers::{self, Local, SendSync},
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use slotbox_internals::{InvokeVtable, RawSlot};

    use crate::markers::SendSync;

    /// A nullable, cloneable wrapper around any callable with the argument
    /// tuple `A` and the return type `R`.
    ///
    /// Closures and function pointers that fit in one machine word are stored
    /// inside the wrapper itself. Larger closures are stored in a heap
    /// allocation owned by the wrapper.
    ///
    /// # Type Parameters
    /// - `A`: The arguments as a tuple, e.g. `(i32, &'static str)`. Use `()`
    ///   for callables without parameters.
    /// - `R`: The return type.
    /// - `ThreadSafety`: The thread safety marker for the wrapper. This can
    ///   either be [`SendSync`] or [`Local`].
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::Function;
    ///
    /// let offset = 10;
    /// let add: Function<(i32,), i32> = Function::new(move |value: i32| value + offset);
    /// assert_eq!(add.call((5,)), Ok(15));
    ///
    /// let empty: Function<(i32,), i32> = Function::empty();
    /// assert!(empty.call((5,)).is_err());
    /// ```
    ///
    /// [`SendSync`]: crate::markers::SendSync
    /// [`Local`]: crate::markers::Local
    #[repr(transparent)]
    pub struct Function<A: 'static, R: 'static = (), ThreadSafety: 'static = SendSync> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. If the slot is occupied, `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The callable held by the [`RawSlot`], if any,
        ///    must be `Send + Sync`.
        raw: RawSlot<InvokeVtable<A, R>>,
        _thread_safety: PhantomData<ThreadSafety>,
    }

    impl<A: 'static, R: 'static, T> Function<A, R, T> {
        /// Creates a new [`Function`] from a [`RawSlot`]
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If the slot is occupied, `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The callable held by the [`RawSlot`], if any,
        ///    must be `Send + Sync`.
        #[must_use]
        pub(crate) const unsafe fn from_raw(raw: RawSlot<InvokeVtable<A, R>>) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by the caller
            // 2. Guaranteed by the caller
            Self {
                raw,
                _thread_safety: PhantomData,
            }
        }

        /// Consumes the [`Function`] and returns the inner [`RawSlot`].
        #[must_use]
        pub(crate) fn into_raw(self) -> RawSlot<InvokeVtable<A, R>> {
            // SAFETY: We are destroying `self`, so we no longer
            // need to uphold any safety invariants.
            self.raw
        }

        /// Returns a reference to the inner [`RawSlot`].
        #[must_use]
        pub(crate) fn as_raw(&self) -> &RawSlot<InvokeVtable<A, R>> {
            &self.raw
        }

        /// Returns a mutable reference to the inner [`RawSlot`].
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If `T = SendSync`: No callable that is not `Send + Sync` is
        ///    stored into the [`RawSlot`] through the returned reference.
        #[must_use]
        pub(crate) unsafe fn as_raw_mut(&mut self) -> &mut RawSlot<InvokeVtable<A, R>> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. Guaranteed by the caller
            &mut self.raw
        }
    }
}
pub use limit_field_access::Function;

impl<A: 'static, R: 'static, T> Function<A, R, T> {
    /// Creates an empty function.
    ///
    /// Calling an empty function returns [`BadCall`].
    #[must_use]
    pub const fn empty() -> Self {
        // SAFETY:
        // 1. The slot is empty.
        // 2. The slot is empty.
        unsafe { Self::from_raw(RawSlot::empty()) }
    }

    /// Creates a function wrapping `callable`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::Function;
    ///
    /// fn shout(text: String) -> String {
    ///     text.to_uppercase()
    /// }
    ///
    /// let function: Function<(String,), String> = Function::new(shout);
    /// assert_eq!(function.call((String::from("hi"),)).unwrap(), "HI");
    /// ```
    #[must_use]
    pub fn new<F>(callable: F) -> Self
    where
        F: markers::ObjectMarkerFor<T> + Invoke<A, Output = R> + Clone,
    {
        trace_placed::<F>();
        // SAFETY:
        // 1. `F: ObjectMarkerFor<T>` is only implemented for `SendSync` and
        //    `Local`.
        // 2. If `T = SendSync`, then `F: ObjectMarkerFor<SendSync>` implies
        //    `F: Send + Sync`.
        unsafe { Self::from_raw(RawSlot::new(callable)) }
    }

    /// Calls the wrapped callable with `args`.
    ///
    /// A panic inside the callable propagates to the caller unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BadCall`] if the function is empty.
    pub fn call(&self, args: A) -> Result<R, BadCall> {
        self.as_raw().invoke(args).ok_or_else(|| {
            tracing::debug!(
                arguments = type_name::<A>(),
                output = type_name::<R>(),
                "called an empty function"
            );
            BadCall
        })
    }

    /// Moves the callable out into a new function, leaving this one empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::Function;
    ///
    /// let mut source: Function<(), u8> = Function::new(|| 1_u8);
    /// let destination = source.take();
    /// assert!(source.is_empty());
    /// assert_eq!(destination.call(()), Ok(1));
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        // SAFETY:
        // 1. No callable is stored into `self`.
        let raw = unsafe { self.as_raw_mut() }.take();
        // SAFETY:
        // 1. `T` is unchanged.
        // 2. The callable was held by a `Function<A, R, T>`.
        unsafe { Self::from_raw(raw) }
    }

    /// Moves the callable held by `other` into this function, dropping the
    /// previous callable and leaving `other` empty.
    pub fn assign_from(&mut self, other: &mut Self) {
        *self = other.take();
    }

    /// Replaces the wrapped callable with `callable`.
    pub fn set<F>(&mut self, callable: F)
    where
        F: markers::ObjectMarkerFor<T> + Invoke<A, Output = R> + Clone,
    {
        trace_placed::<F>();
        // SAFETY:
        // 1. The stored `F` is `Send + Sync` if `T = SendSync`, as implied by
        //    `F: ObjectMarkerFor<T>`.
        let raw = unsafe { self.as_raw_mut() };
        raw.emplace(callable);
    }

    /// Drops the wrapped callable, leaving the function empty.
    pub fn reset(&mut self) {
        // SAFETY:
        // 1. No callable is stored into the slot.
        unsafe { self.as_raw_mut() }.reset();
    }

    /// Exchanges the callables of two functions without cloning either.
    pub fn swap(&mut self, other: &mut Self) {
        // SAFETY:
        // 1. Both functions have the same marker, so the callable moved into
        //    each slot already satisfied its invariants.
        let other = unsafe { other.as_raw_mut() };
        // SAFETY: See above.
        unsafe { self.as_raw_mut() }.swap(other);
    }

    /// Returns `true` if the function does not wrap a callable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_raw().is_empty()
    }

    /// Returns `true` if the function wraps a callable.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.as_raw().has_value()
    }

    /// Returns the identity of the wrapped callable's type, or
    /// [`TypeInfo::none`] if the function is empty.
    #[must_use]
    pub fn target_type(&self) -> TypeInfo {
        TypeInfo::of_slot(self.as_raw())
    }

    /// Returns a reference to the wrapped callable if it has type `F`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::Function;
    ///
    /// fn double(value: u32) -> u32 {
    ///     value * 2
    /// }
    ///
    /// let function: Function<(u32,), u32> = Function::new(double as fn(u32) -> u32);
    /// let pointer: &fn(u32) -> u32 = function.target().unwrap();
    /// assert_eq!(pointer(4), 8);
    /// ```
    #[must_use]
    pub fn target<F: 'static>(&self) -> Option<&F> {
        self.as_raw().downcast_ref::<F>()
    }

    /// Returns a mutable reference to the wrapped callable if it has type `F`.
    #[must_use]
    pub fn target_mut<F: 'static>(&mut self) -> Option<&mut F> {
        // SAFETY:
        // 1. The slot is only used to borrow the existing callable.
        unsafe { self.as_raw_mut() }.downcast_mut::<F>()
    }

    /// Returns how the wrapped callable is stored, or `None` if the function
    /// is empty.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.as_raw().placement()
    }

    /// Converts the function to one that is not `Send` or `Sync`.
    #[must_use]
    pub fn into_local(self) -> Function<A, R, Local> {
        let raw = self.into_raw();

        // SAFETY:
        // 1. `T=Local`, so this is trivially true.
        // 2. `T=Local`, so this is trivially true.
        unsafe { Function::from_raw(raw) }
    }
}

impl<A: 'static, R: 'static> Function<A, R, SendSync> {
    /// Creates a thread-safe function wrapping `callable`.
    ///
    /// Same as [`Function::new`], but the thread safety marker does not need
    /// to be inferred.
    #[must_use]
    pub fn new_sendsync<F>(callable: F) -> Self
    where
        F: Invoke<A, Output = R> + Send + Sync + Clone + 'static,
    {
        Self::new(callable)
    }
}

impl<A: 'static, R: 'static> Function<A, R, Local> {
    /// Creates a local function wrapping `callable`.
    ///
    /// Same as [`Function::new`], but the thread safety marker does not need
    /// to be inferred.
    #[must_use]
    pub fn new_local<F>(callable: F) -> Self
    where
        F: Invoke<A, Output = R> + Clone + 'static,
    {
        Self::new(callable)
    }
}

/// Records where a callable of type `F` is about to be placed.
fn trace_placed<F: 'static>() {
    tracing::trace!(
        type_name = type_name::<F>(),
        placement = ?Placement::of::<F>(),
        "placing callable"
    );
}

impl<A: 'static, R: 'static, T> Default for Function<A, R, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: 'static, R: 'static, T> Clone for Function<A, R, T> {
    fn clone(&self) -> Self {
        if self.has_target() {
            tracing::trace!(
                type_name = self.target_type().name(),
                placement = ?self.placement(),
                "copying callable"
            );
        }

        let raw = self.as_raw().clone();
        // SAFETY:
        // 1. `T` is unchanged.
        // 2. The copy has the same type as a callable held by a
        //    `Function<A, R, T>`.
        unsafe { Self::from_raw(raw) }
    }
}

impl<A: 'static, R: 'static, T> fmt::Debug for Function<A, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Function(<empty>)")
        } else {
            f.debug_struct("Function")
                .field("target_type", &self.target_type().name())
                .finish()
        }
    }
}

impl<A: 'static, R: 'static> From<Function<A, R, SendSync>> for Function<A, R, Local> {
    fn from(function: Function<A, R, SendSync>) -> Self {
        function.into_local()
    }
}

// SAFETY: The `SendSync` marker indicates that the wrapped callable is
// `Send`+`Sync`. The wrapper holds no values of type `A` or `R`, so it is
// safe to implement `Send`+`Sync` for the wrapper itself.
unsafe impl<A: 'static, R: 'static> Send for Function<A, R, SendSync> {}

// SAFETY: The `SendSync` marker indicates that the wrapped callable is
// `Send`+`Sync`. The wrapper holds no values of type `A` or `R`, so it is
// safe to implement `Send`+`Sync` for the wrapper itself.
unsafe impl<A: 'static, R: 'static> Sync for Function<A, R, SendSync> {}
