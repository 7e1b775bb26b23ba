#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Type-erased values and callables with inline storage for word-sized types.
//!
//! ## Overview
//!
//! This crate provides two owning containers whose contents are chosen at
//! runtime:
//!
//! - [`AnyValue`] holds at most one value of any cloneable type, and hands it
//!   back only when asked for the exact type it holds.
//! - [`Function`] holds at most one callable with a fixed signature, such as
//!   a closure or a function pointer, and calls it on demand.
//!
//! Both containers are cloneable: copying the container copies the value
//! inside it, whatever its type.
//!
//! ## Quick Example
//!
//! ```
//! use slotbox::{AnyValue, Function};
//!
//! let mut value: AnyValue = AnyValue::new(1_i32);
//! assert_eq!(value.get::<i32>(), Ok(&1));
//! assert!(value.get::<f64>().is_err());
//!
//! value.set(String::from("hello"));
//! assert_eq!(value.get::<String>().unwrap(), "hello");
//!
//! let mut other: AnyValue = AnyValue::new(2_i32);
//! value.swap(&mut other);
//! assert_eq!(value.get::<i32>(), Ok(&2));
//! assert_eq!(other.get::<String>().unwrap(), "hello");
//!
//! let greet: Function<(&'static str,), String> =
//!     Function::new(|name: &'static str| format!("hi {name}"));
//! assert_eq!(greet.call(("there",)).unwrap(), "hi there");
//! ```
//!
//! ## Storage
//!
//! A value whose type is no larger than a machine word and no more strictly
//! aligned than one (see [`Placement::of`]) is stored directly inside the
//! container, so holding an integer, a `Box`, an `Arc` or a small closure
//! never allocates. Everything else lives in one heap allocation owned by the
//! container. The choice is made per type at compile time and can be
//! inspected with [`AnyValue::placement`].
//!
//! Moving a container, with [`AnyValue::take`] or [`AnyValue::swap`], never
//! clones the value and never moves a heap value out of its allocation. The
//! source of a move is left empty.
//!
//! ## Errors
//!
//! Typed accesses that ask for the wrong type fail with [`BadAccess`], which
//! records both the requested and the actual type. Calling an empty
//! [`Function`] fails with [`BadCall`]. Neither failure modifies the
//! container.
//!
//! ## Thread Safety
//!
//! Both containers take a thread-safety marker from [`markers`] as their last
//! type parameter. The default, [`SendSync`](markers::SendSync), accepts only
//! `Send + Sync` values and makes the container `Send + Sync`. Use
//! [`Local`](markers::Local) to store values like `Rc`.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `TRACE` when a value is placed or
//! copied, `DEBUG` when a typed access or call is refused. Install a
//! subscriber to see them.
//!
//! For implementation details, see the [`slotbox-internals`] crate.
//!
//! [`slotbox-internals`]: slotbox_internals

extern crate alloc;

mod any_value;
mod error;
mod function;
pub mod markers;
pub mod prelude;
mod type_info;

pub use slotbox_internals::{INLINE_ALIGN, INLINE_CAPACITY, Placement, invoke::Invoke};

pub use self::{
    any_value::{AnyValue, swap},
    error::{BadAccess, BadCall},
    function::Function,
    type_info::TypeInfo,
};
