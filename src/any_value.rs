use core::{any::type_name, fmt};

use slotbox_internals::{Placement, RawSlot};

use crate::{
    BadAccess, TypeInfo,
    markers::{self, Local, SendSync},
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use slotbox_internals::RawSlot;

    use crate::markers::SendSync;

    /// A container that holds at most one value of any cloneable type.
    ///
    /// Values that fit in one machine word (see
    /// [`Placement`](crate::Placement)) are stored inside the container
    /// itself. Larger values are stored in a heap allocation owned by the
    /// container.
    ///
    /// # Type Parameters
    /// - `ThreadSafety`: The thread safety marker for the container. This can
    ///   either be [`SendSync`] or [`Local`].
    ///
    /// [`SendSync`]: crate::markers::SendSync
    /// [`Local`]: crate::markers::Local
    #[repr(transparent)]
    pub struct AnyValue<ThreadSafety: 'static = SendSync> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. If the slot is occupied, `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The value held by the [`RawSlot`], if any,
        ///    must be `Send + Sync`.
        raw: RawSlot,
        _thread_safety: PhantomData<ThreadSafety>,
    }

    impl<T> AnyValue<T> {
        /// Creates a new [`AnyValue`] from a [`RawSlot`]
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If the slot is occupied, `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The value held by the [`RawSlot`], if any,
        ///    must be `Send + Sync`.
        #[must_use]
        pub(crate) const unsafe fn from_raw(raw: RawSlot) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by the caller
            // 2. Guaranteed by the caller
            Self {
                raw,
                _thread_safety: PhantomData,
            }
        }

        /// Consumes the [`AnyValue`] and returns the inner [`RawSlot`].
        #[must_use]
        pub(crate) fn into_raw(self) -> RawSlot {
            // SAFETY: We are destroying `self`, so we no longer
            // need to uphold any safety invariants.
            self.raw
        }

        /// Returns a reference to the inner [`RawSlot`].
        #[must_use]
        pub(crate) fn as_raw(&self) -> &RawSlot {
            &self.raw
        }

        /// Returns a mutable reference to the inner [`RawSlot`].
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If `T = SendSync`: No value that is not `Send + Sync` is stored
        ///    into the [`RawSlot`] through the returned reference.
        #[must_use]
        pub(crate) unsafe fn as_raw_mut(&mut self) -> &mut RawSlot {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. Guaranteed by the caller
            &mut self.raw
        }
    }
}
pub use limit_field_access::AnyValue;

impl<T> AnyValue<T> {
    /// Creates an empty container.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let value: AnyValue = AnyValue::empty();
    /// assert!(!value.has_value());
    /// ```
    #[must_use]
    pub const fn empty() -> Self {
        // SAFETY:
        // 1. The slot is empty.
        // 2. The slot is empty.
        unsafe { Self::from_raw(RawSlot::empty()) }
    }

    /// Creates a container holding `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::{AnyValue, Placement};
    ///
    /// let small: AnyValue = AnyValue::new(1_i32);
    /// assert_eq!(small.placement(), Some(Placement::Inline));
    ///
    /// let large: AnyValue = AnyValue::new(String::from("hello"));
    /// assert_eq!(large.placement(), Some(Placement::Heap));
    /// ```
    #[must_use]
    pub fn new<V>(value: V) -> Self
    where
        V: markers::ObjectMarkerFor<T> + Clone,
    {
        trace_placed::<V>();
        // SAFETY:
        // 1. `V: ObjectMarkerFor<T>` is only implemented for `SendSync` and
        //    `Local`.
        // 2. If `T = SendSync`, then `V: ObjectMarkerFor<SendSync>` implies
        //    `V: Send + Sync`.
        unsafe { Self::from_raw(RawSlot::new(value)) }
    }

    /// Creates a container holding the value returned by `make`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let value: AnyValue = AnyValue::new_with(|| vec![1_u8, 2, 3]);
    /// assert_eq!(value.get::<Vec<u8>>().unwrap().len(), 3);
    /// ```
    #[must_use]
    pub fn new_with<V, F>(make: F) -> Self
    where
        V: markers::ObjectMarkerFor<T> + Clone,
        F: FnOnce() -> V,
    {
        Self::new(make())
    }

    /// Moves the held value out into a new container, leaving this one empty.
    ///
    /// The value is not cloned and a heap value keeps its allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let mut source: AnyValue = AnyValue::new(String::from("moved"));
    /// let destination = source.take();
    /// assert!(!source.has_value());
    /// assert_eq!(destination.get::<String>().unwrap(), "moved");
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        // SAFETY:
        // 1. No value is stored into `self`.
        let raw = unsafe { self.as_raw_mut() }.take();
        // SAFETY:
        // 1. `T` is unchanged.
        // 2. The value was held by an `AnyValue<T>`.
        unsafe { Self::from_raw(raw) }
    }

    /// Moves the value held by `other` into this container, dropping the
    /// previous value and leaving `other` empty.
    pub fn assign_from(&mut self, other: &mut Self) {
        *self = other.take();
    }

    /// Returns `true` if the container holds a value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.as_raw().has_value()
    }

    /// Returns the identity of the held type, or [`TypeInfo::none`] if the
    /// container is empty.
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo::of_slot(self.as_raw())
    }

    /// Returns the name of the held type, or `"<none>"` if the container is
    /// empty.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_info().name()
    }

    /// Returns how the held value is stored, or `None` if the container is
    /// empty.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.as_raw().placement()
    }

    /// Returns `true` if the container holds a value of type `V`.
    #[must_use]
    pub fn is<V: 'static>(&self) -> bool {
        self.as_raw().is::<V>()
    }

    /// Returns a reference to the held value if it has type `V`.
    ///
    /// This is the pointer form of a typed access: a mismatch is reported as
    /// `None` rather than as an error.
    #[must_use]
    pub fn downcast_ref<V: 'static>(&self) -> Option<&V> {
        self.as_raw().downcast_ref::<V>()
    }

    /// Returns a mutable reference to the held value if it has type `V`.
    #[must_use]
    pub fn downcast_mut<V: 'static>(&mut self) -> Option<&mut V> {
        // SAFETY:
        // 1. The slot is only used to borrow the existing value.
        unsafe { self.as_raw_mut() }.downcast_mut::<V>()
    }

    /// Returns a reference to the held value.
    ///
    /// # Errors
    ///
    /// Returns [`BadAccess`] if the container is empty or holds another type.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let value: AnyValue = AnyValue::new(1_i32);
    /// assert_eq!(value.get::<i32>(), Ok(&1));
    /// assert!(value.get::<f64>().is_err());
    /// ```
    pub fn get<V: 'static>(&self) -> Result<&V, BadAccess> {
        self.downcast_ref::<V>()
            .ok_or_else(|| self.bad_access::<V>())
    }

    /// Returns a mutable reference to the held value.
    ///
    /// # Errors
    ///
    /// Returns [`BadAccess`] if the container is empty or holds another type.
    pub fn get_mut<V: 'static>(&mut self) -> Result<&mut V, BadAccess> {
        if !self.is::<V>() {
            return Err(self.bad_access::<V>());
        }

        // SAFETY:
        // 1. The slot is only used to borrow the existing value.
        let raw = unsafe { self.as_raw_mut() };
        // SAFETY:
        // 1. The slot holds a `V`, as checked above.
        Ok(unsafe { raw.downcast_mut_unchecked::<V>() })
    }

    /// Returns a copy of the held value.
    ///
    /// # Errors
    ///
    /// Returns [`BadAccess`] if the container is empty or holds another type.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let value: AnyValue = AnyValue::new(String::from("copy"));
    /// let copy: String = value.cast::<String>().unwrap();
    /// assert_eq!(copy, "copy");
    /// assert!(value.has_value());
    /// ```
    pub fn cast<V: Clone + 'static>(&self) -> Result<V, BadAccess> {
        self.get::<V>().cloned()
    }

    /// Moves the held value out, leaving the container empty.
    ///
    /// # Errors
    ///
    /// Returns [`BadAccess`] if the container is empty or holds another type.
    /// The container is left unchanged in that case.
    pub fn take_as<V: 'static>(&mut self) -> Result<V, BadAccess> {
        // SAFETY:
        // 1. No value is stored into the slot.
        let raw = unsafe { self.as_raw_mut() };
        match raw.take_as::<V>() {
            Some(value) => Ok(value),
            None => Err(self.bad_access::<V>()),
        }
    }

    /// Replaces the held value with `value` and returns a reference to it.
    ///
    /// The previous value is dropped first.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let mut value: AnyValue = AnyValue::new(1_i32);
    /// value.emplace(String::from("hello")).push_str(", world");
    /// assert_eq!(value.get::<String>().unwrap(), "hello, world");
    /// ```
    pub fn emplace<V>(&mut self, value: V) -> &mut V
    where
        V: markers::ObjectMarkerFor<T> + Clone,
    {
        self.emplace_with(move || value)
    }

    /// Replaces the held value with the value returned by `make` and returns a
    /// reference to it.
    ///
    /// The previous value is dropped before `make` runs. If `make` panics the
    /// container is left empty.
    pub fn emplace_with<V, F>(&mut self, make: F) -> &mut V
    where
        V: markers::ObjectMarkerFor<T> + Clone,
        F: FnOnce() -> V,
    {
        trace_placed::<V>();
        // SAFETY:
        // 1. The stored `V` is `Send + Sync` if `T = SendSync`, as implied by
        //    `V: ObjectMarkerFor<T>`.
        let raw = unsafe { self.as_raw_mut() };
        raw.emplace_with(make)
    }

    /// Replaces the held value with `value`.
    pub fn set<V>(&mut self, value: V)
    where
        V: markers::ObjectMarkerFor<T> + Clone,
    {
        self.emplace(value);
    }

    /// Drops the held value, leaving the container empty.
    pub fn reset(&mut self) {
        // SAFETY:
        // 1. No value is stored into the slot.
        unsafe { self.as_raw_mut() }.reset();
    }

    /// Exchanges the contents of two containers without cloning either value.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotbox::AnyValue;
    ///
    /// let mut a: AnyValue = AnyValue::new(1_i32);
    /// let mut b: AnyValue = AnyValue::new(String::from("two"));
    /// a.swap(&mut b);
    /// assert_eq!(a.get::<String>().unwrap(), "two");
    /// assert_eq!(b.get::<i32>(), Ok(&1));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        // SAFETY:
        // 1. Both containers have the same marker, so the value moved into
        //    each slot already satisfied its invariants.
        let other = unsafe { other.as_raw_mut() };
        // SAFETY: See above.
        unsafe { self.as_raw_mut() }.swap(other);
    }

    /// Converts the container to one that is not `Send` or `Sync`.
    #[must_use]
    pub fn into_local(self) -> AnyValue<Local> {
        let raw = self.into_raw();

        // SAFETY:
        // 1. `T=Local`, so this is trivially true.
        // 2. `T=Local`, so this is trivially true.
        unsafe { AnyValue::from_raw(raw) }
    }

    /// Builds the error for a refused access to a `V`.
    fn bad_access<V: 'static>(&self) -> BadAccess {
        let error = BadAccess {
            expected: TypeInfo::of::<V>(),
            found: self.type_info(),
        };
        tracing::debug!(
            expected = error.expected.name(),
            found = error.found.name(),
            "refused typed access"
        );
        error
    }
}

impl AnyValue<SendSync> {
    /// Creates a thread-safe container holding `value`.
    ///
    /// Same as [`AnyValue::new`], but the thread safety marker does not need
    /// to be inferred.
    ///
    /// # Examples
    ///
    /// ```
    /// let value = slotbox::AnyValue::new_sendsync(7_u8);
    /// assert_eq!(value.get::<u8>(), Ok(&7));
    /// ```
    #[must_use]
    pub fn new_sendsync<V>(value: V) -> Self
    where
        V: Send + Sync + Clone + 'static,
    {
        Self::new(value)
    }
}

impl AnyValue<Local> {
    /// Creates a local container holding `value`.
    ///
    /// Same as [`AnyValue::new`], but the thread safety marker does not need
    /// to be inferred.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    ///
    /// let value = slotbox::AnyValue::new_local(Rc::new(7_u8));
    /// assert_eq!(**value.get::<Rc<u8>>().unwrap(), 7);
    /// ```
    #[must_use]
    pub fn new_local<V>(value: V) -> Self
    where
        V: Clone + 'static,
    {
        Self::new(value)
    }
}

/// Exchanges the contents of two containers.
///
/// Equivalent to [`AnyValue::swap`].
pub fn swap<T>(a: &mut AnyValue<T>, b: &mut AnyValue<T>) {
    a.swap(b);
}

/// Records where a value of type `V` is about to be placed.
fn trace_placed<V: 'static>() {
    tracing::trace!(
        type_name = type_name::<V>(),
        placement = ?Placement::of::<V>(),
        "placing value"
    );
}

impl<T> Default for AnyValue<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Clone for AnyValue<T> {
    fn clone(&self) -> Self {
        if self.has_value() {
            tracing::trace!(
                type_name = self.type_name(),
                placement = ?self.placement(),
                "copying value"
            );
        }

        let raw = self.as_raw().clone();
        // SAFETY:
        // 1. `T` is unchanged.
        // 2. The copy has the same type as a value held by an `AnyValue<T>`.
        unsafe { Self::from_raw(raw) }
    }
}

impl<T> fmt::Debug for AnyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.placement() {
            Some(placement) => f
                .debug_struct("AnyValue")
                .field("type_name", &self.type_name())
                .field("placement", &placement)
                .finish(),
            None => f.write_str("AnyValue(<empty>)"),
        }
    }
}

impl From<AnyValue<SendSync>> for AnyValue<Local> {
    fn from(value: AnyValue<SendSync>) -> Self {
        value.into_local()
    }
}

// SAFETY: The `SendSync` marker indicates that the held value is
// `Send`+`Sync`. Therefore it is safe to implement `Send`+`Sync` for the
// container itself.
unsafe impl Send for AnyValue<SendSync> {}

// SAFETY: The `SendSync` marker indicates that the held value is
// `Send`+`Sync`. Therefore it is safe to implement `Send`+`Sync` for the
// container itself.
unsafe impl Sync for AnyValue<SendSync> {}
