//! A single calling convention for callables of any arity.
//!
//! The invocation entry of an [`InvokeVtable`](crate::InvokeVtable) is one
//! function pointer type, so callables with different numbers of parameters
//! need to be called the same way. The [`Invoke`] trait does this by passing
//! all arguments as one tuple: a closure `|a: i32, b: i32| a + b` implements
//! `Invoke<(i32, i32), Output = i32>`.
//!
//! [`Invoke`] is implemented for every [`Fn`] taking up to eight arguments.

/// A callable that accepts its arguments as the tuple `Args`.
///
/// # Examples
///
/// ```
/// use slotbox_internals::invoke::Invoke;
///
/// let add = |a: i32, b: i32| a + b;
/// assert_eq!(add.invoke((2, 3)), 5);
///
/// let answer = || 42;
/// assert_eq!(answer.invoke(()), 42);
/// ```
pub trait Invoke<Args> {
    /// The value returned by the callable.
    type Output;

    /// Calls the callable, spreading `args` into its parameters.
    fn invoke(&self, args: Args) -> Self::Output;
}

/// Implements [`Invoke`] for every [`Fn`] with the given parameter list.
macro_rules! impl_invoke {
    ($($arg:ident: $ty:ident),*) => {
        impl<Func, Ret, $($ty,)*> Invoke<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(a1: A1);
impl_invoke!(a1: A1, a2: A2);
impl_invoke!(a1: A1, a2: A2, a3: A3);
impl_invoke!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_invoke!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_invoke!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);
impl_invoke!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7);
impl_invoke!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8);

#[cfg(test)]
mod tests {
    use alloc::{
        string::{String, ToString},
        vec::Vec,
    };
    use core::cell::Cell;

    use super::*;

    fn call_erased<F: Invoke<A>, A>(callable: &F, args: A) -> F::Output {
        callable.invoke(args)
    }

    #[test]
    fn test_invoke_arities() {
        assert_eq!(call_erased(&|| 0_u8, ()), 0);
        assert_eq!(call_erased(&|a: u8| a, (1,)), 1);
        assert_eq!(call_erased(&|a: u8, b: u8| a + b, (1, 2)), 3);
        assert_eq!(
            call_erased(
                &|a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8| {
                    a + b + c + d + e + f + g + h
                },
                (1, 1, 1, 1, 1, 1, 1, 1)
            ),
            8
        );
    }

    #[test]
    fn test_invoke_function_pointer() {
        fn describe(name: &str, count: usize) -> String {
            let mut text = name.to_string();
            text.push(':');
            text.push_str(&count.to_string());
            text
        }

        let pointer: fn(&str, usize) -> String = describe;
        assert_eq!(pointer.invoke(("apples", 3)), "apples:3");
    }

    #[test]
    fn test_invoke_keeps_state() {
        let calls = Cell::new(0_u32);
        let counting = |value: u32| {
            calls.set(calls.get() + 1);
            value * 2
        };

        let results: Vec<u32> = (1..=3).map(|value| counting.invoke((value,))).collect();
        assert_eq!(results, [2, 4, 6]);
        assert_eq!(calls.get(), 3);
    }
}
