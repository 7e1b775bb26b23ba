//! Commonly used items for convenient importing.
//!
//! The prelude re-exports the containers, their errors and the thread-safety
//! markers, so everything needed for everyday use comes from one statement.
//!
//! # Usage
//!
//! ```rust
//! use slotbox::prelude::*;
//!
//! let mut value: AnyValue = AnyValue::new(1_i32);
//! assert_eq!(value.get::<i32>(), Ok(&1));
//!
//! value.set(String::from("now a string"));
//! let error: BadAccess = value.get::<i32>().unwrap_err();
//! assert_eq!(error.found, TypeInfo::of::<String>());
//!
//! let double: Function<(i32,), i32> = Function::new(|x: i32| x * 2);
//! assert_eq!(double.call((21,)), Ok(42));
//! ```

pub use crate::{AnyValue, BadAccess, BadCall, Function, Placement, TypeInfo, markers};
