//! Errors returned by typed access and calls.

use crate::TypeInfo;

/// A typed access requested a type other than the one held.
///
/// Returned by [`AnyValue::get`], [`AnyValue::cast`] and the other checked
/// accessors when the container holds a different type, or nothing at all.
/// The container is left unchanged.
///
/// # Examples
///
/// ```
/// use slotbox::{AnyValue, BadAccess, TypeInfo};
///
/// let value: AnyValue = AnyValue::new(1_i32);
/// let error: BadAccess = value.get::<f64>().unwrap_err();
/// assert_eq!(error.expected, TypeInfo::of::<f64>());
/// assert_eq!(error.found, TypeInfo::of::<i32>());
/// assert_eq!(
///     error.to_string(),
///     "bad access: requested `f64` but the slot holds `i32`"
/// );
/// ```
///
/// [`AnyValue::get`]: crate::AnyValue::get
/// [`AnyValue::cast`]: crate::AnyValue::cast
#[derive(Copy, Clone, PartialEq, Eq, Debug, thiserror::Error)]
#[error("bad access: requested `{expected}` but the slot holds `{found}`")]
pub struct BadAccess {
    /// The type that was requested.
    pub expected: TypeInfo,
    /// The type actually held, or [`TypeInfo::none`] for an empty container.
    pub found: TypeInfo,
}

/// An empty [`Function`](crate::Function) was called.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, thiserror::Error)]
#[error("bad call: invoked an empty function")]
pub struct BadCall;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    static_assertions::assert_impl_all!(BadAccess: core::error::Error, Send, Sync, Copy);
    static_assertions::assert_impl_all!(BadCall: core::error::Error, Send, Sync, Copy);

    #[test]
    fn test_bad_access_message() {
        let error = BadAccess {
            expected: TypeInfo::of::<u8>(),
            found: TypeInfo::none(),
        };
        assert_eq!(
            error.to_string(),
            "bad access: requested `u8` but the slot holds `<none>`"
        );
    }

    #[test]
    fn test_bad_call_message() {
        assert_eq!(BadCall.to_string(), "bad call: invoked an empty function");
    }
}
