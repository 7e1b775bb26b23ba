//! Runtime type identity.

use core::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
};

use slotbox_internals::{RawSlot, Vtable};

/// Identity of a concrete type, as reported by an [`AnyValue`] or the target
/// of a [`Function`].
///
/// Two [`TypeInfo`]s are equal exactly when they describe the same type.
/// The type name is carried for diagnostics only and does not take part in
/// comparisons or hashing.
///
/// An empty container or function reports [`TypeInfo::none`].
///
/// # Examples
///
/// ```
/// use slotbox::{AnyValue, TypeInfo};
///
/// let value: AnyValue = AnyValue::new(1_i32);
/// assert_eq!(value.type_info(), TypeInfo::of::<i32>());
/// assert_ne!(value.type_info(), TypeInfo::of::<f64>());
///
/// let empty: AnyValue = AnyValue::empty();
/// assert!(empty.type_info().is_none());
/// ```
///
/// [`AnyValue`]: crate::AnyValue
/// [`Function`]: crate::Function
#[derive(Copy, Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

/// The type reported by empty slots.
enum NoType {}

impl TypeInfo {
    /// Returns the [`TypeInfo`] of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Returns the sentinel reported when no value is held.
    #[inline]
    pub fn none() -> Self {
        Self {
            id: TypeId::of::<NoType>(),
            name: "<none>",
        }
    }

    /// Returns `true` if this is the [`TypeInfo::none`] sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.id == TypeId::of::<NoType>()
    }

    /// Returns the [`TypeId`] of the described type.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the name of the described type, as given by
    /// [`core::any::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn of_slot<V: Vtable>(raw: &RawSlot<V>) -> Self {
        match (raw.type_id(), raw.type_name()) {
            (Some(id), Some(name)) => Self { id, name },
            _ => Self::none(),
        }
    }
}

impl PartialEq for TypeInfo {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String};

    use super::*;

    #[test]
    fn test_type_info_equality_uses_id() {
        assert_eq!(TypeInfo::of::<String>(), TypeInfo::of::<String>());
        assert_ne!(TypeInfo::of::<u32>(), TypeInfo::of::<i32>());
        assert_ne!(TypeInfo::of::<()>(), TypeInfo::none());
        assert_eq!(TypeInfo::none(), TypeInfo::none());
    }

    #[test]
    fn test_type_info_none() {
        assert!(TypeInfo::none().is_none());
        assert!(!TypeInfo::of::<u8>().is_none());
        assert_eq!(TypeInfo::none().name(), "<none>");
    }

    #[test]
    fn test_type_info_formatting() {
        let info = TypeInfo::of::<u64>();
        assert_eq!(format!("{info}"), "u64");
        assert_eq!(format!("{info:?}"), "TypeInfo(\"u64\")");
        assert_eq!(info.id(), TypeId::of::<u64>());
    }

    #[test]
    fn test_type_info_of_slot() {
        let raw: RawSlot = RawSlot::new(2_u16);
        assert_eq!(TypeInfo::of_slot(&raw), TypeInfo::of::<u16>());

        let empty: RawSlot = RawSlot::empty();
        assert!(TypeInfo::of_slot(&empty).is_none());
    }
}
