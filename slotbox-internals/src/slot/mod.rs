//! Module containing the erased slot and its vtables

pub(crate) mod payload;
mod raw;
mod vtable;

pub use self::{
    raw::RawSlot,
    vtable::{InvokeVtable, StorageVtable, Vtable, VtableFor},
};
