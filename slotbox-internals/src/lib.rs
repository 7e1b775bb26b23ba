#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`slotbox`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage engine that powers
//! the `AnyValue` and `Function` types of [`slotbox`]. It owns every `unsafe`
//! operation of the project: placing a value either inline or on the heap,
//! and copying, moving, dropping and invoking it again once its type has been
//! forgotten.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on [`slotbox`] instead.
//!
//! # Architecture
//!
//! - **[`placement`]**: The compile-time decision between inline and heap
//!   storage ([`Placement::of`]).
//! - **[`slot`]**: The erased slot itself
//!   - [`RawSlot`]: Owner of at most one erased value
//!   - [`Payload`]: The dual inline/heap representation
//!   - [`StorageVtable`]: Function pointers for clone and drop
//!   - [`InvokeVtable`]: A [`StorageVtable`] plus an invocation entry
//! - **[`invoke`]**: The [`Invoke`] trait which gives closures of any arity a
//!   single tuple-based calling convention.
//!
//! # Safety Strategy
//!
//! A [`RawSlot`] stores a vtable reference next to an untyped payload. The
//! vtable's function pointers are only sound to call when the payload holds a
//! value of exactly the type the vtable was generated for. This crate keeps
//! the two in sync through:
//!
//! - **Module-based encapsulation**: The fields of [`RawSlot`] and of the
//!   vtables are private to their modules, so every place that pairs a
//!   payload with a vtable is visible in a single file.
//! - **Sealed vtable traits**: [`VtableFor<T>`] can only be implemented in
//!   this crate, so a slot can only ever be paired with the vtable generated
//!   for the value it was created from.
//! - **Ordering discipline**: A payload is fully constructed before its
//!   vtable is installed, and the vtable is cleared before the payload is
//!   dropped.
//!
//! [`slotbox`]: https://docs.rs/slotbox/latest/slotbox/
//! [`Payload`]: slot::payload::Payload
//! [`StorageVtable`]: slot::StorageVtable
//! [`InvokeVtable`]: slot::InvokeVtable
//! [`VtableFor<T>`]: slot::VtableFor
//! [`Invoke`]: invoke::Invoke

extern crate alloc;

pub mod invoke;
pub mod placement;
pub mod slot;
mod util;

pub use placement::{INLINE_ALIGN, INLINE_CAPACITY, Placement};
pub use slot::{InvokeVtable, RawSlot, StorageVtable, Vtable, VtableFor};
