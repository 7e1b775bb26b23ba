//! Marker types and traits for thread-safety semantics.
//!
//! Both [`AnyValue<T>`](crate::AnyValue) and
//! [`Function<A, R, T>`](crate::Function) take a thread-safety marker as their
//! last type parameter. The marker decides which types may be stored and,
//! in turn, whether the container itself may cross thread boundaries:
//!
//! - [`SendSync`]: Only `Send + Sync` values can be stored, and the container
//!   is `Send + Sync`. This is the default.
//! - [`Local`]: Any `'static` value can be stored, including `Rc` and other
//!   thread-local data, and the container is neither `Send` nor `Sync`.
//!
//! # Design Philosophy
//!
//! The constraint is enforced when a value is stored. It is impossible to
//! construct an `AnyValue<SendSync>` that holds a value which is not
//! `Send + Sync`, so you can trust that the container truly is thread-safe.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//!
//! use slotbox::{AnyValue, markers::Local};
//!
//! // String is Send + Sync, so the default container works
//! let shared: AnyValue = AnyValue::new(String::from("shared"));
//! std::thread::spawn(move || {
//!     assert!(shared.is::<String>());
//! })
//! .join()
//! .unwrap();
//!
//! // Rc is not, so it needs a local container
//! let local: AnyValue<Local> = AnyValue::new(Rc::new(5_u32));
//! assert_eq!(**local.get::<Rc<u32>>().unwrap(), 5);
//! ```

/// Marker type indicating that a container and its contents are
/// `Send + Sync`.
///
/// Use `SendSync` (the default) unless you need to store thread-local data.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct SendSync;

/// Marker type indicating that a container is not `Send` or `Sync`.
///
/// Use `Local` when the stored values contain:
/// - `Rc<T>` or `Weak<T>` (use `Arc<T>` for a thread-safe alternative)
/// - `Cell`/`RefCell` shared through a closure capture
/// - Raw pointers (`*const T`, `*mut T`)
/// - Any other type that is `!Send` or `!Sync`
///
/// A thread-safe container can be converted with
/// [`AnyValue::into_local`](crate::AnyValue::into_local) or
/// [`Function::into_local`](crate::Function::into_local).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Local;

/// Marker trait combining the object and thread-safety requirements.
///
/// # Implementations
///
/// - For `T = Local`: Implemented for all `Sized + 'static` types, regardless
///   of their `Send`/`Sync` status.
/// - For `T = SendSync`: Implemented only for `Sized + 'static` types that are
///   also `Send + Sync`.
///
/// # Enforcement at Construction
///
/// This trait bounds every operation that stores a value, so a thread-safe
/// container cannot be given thread-local data:
///
/// ```compile_fail
/// use std::rc::Rc;
/// use slotbox::{AnyValue, markers::SendSync};
///
/// // This won't compile because Rc is not Send + Sync
/// let value: AnyValue<SendSync> = AnyValue::new(Rc::new(1_u8));
/// ```
pub trait ObjectMarkerFor<T>: Sized + 'static {}

impl<O: Sized + 'static> ObjectMarkerFor<Local> for O {}

impl<O: Sized + 'static> ObjectMarkerFor<SendSync> for O where O: Send + Sync {}
