//! Behavioral tests for [`Function`].

use std::{
    cell::Cell,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use slotbox::{BadCall, Function, Placement, TypeInfo, markers::Local};

fn add(a: i32, b: i32) -> i32 {
    a + b
}

#[test]
fn test_call_function_pointer_and_closures() {
    let pointer: Function<(i32, i32), i32> = Function::new(add as fn(i32, i32) -> i32);
    assert_eq!(pointer.call((2, 3)), Ok(5));

    let item: Function<(i32, i32), i32> = Function::new(add);
    assert_eq!(item.call((4, 4)), Ok(8));

    let base = 100;
    let closure: Function<(i32,), i32> = Function::new(move |x: i32| x + base);
    assert_eq!(closure.call((1,)), Ok(101));

    let nullary: Function<(), &'static str> = Function::new(|| "no arguments");
    assert_eq!(nullary.call(()), Ok("no arguments"));
}

#[test]
fn test_empty_function_signals_bad_call() {
    let function: Function<(i32,), i32> = Function::default();
    assert!(function.is_empty());
    assert!(!function.has_target());
    assert_eq!(function.call((1,)), Err(BadCall));
    assert!(function.target_type().is_none());
    assert_eq!(function.placement(), None);
}

#[test]
fn test_copy_and_move() {
    let factor = 3;
    let mut original: Function<(i32,), i32> = Function::new(move |x: i32| x * factor);

    let copy = original.clone();
    assert_eq!(original.call((2,)), Ok(6));
    assert_eq!(copy.call((2,)), Ok(6));

    let moved = original.take();
    assert_eq!(original.call((2,)), Err(BadCall));
    assert_eq!(moved.call((3,)), Ok(9));

    let mut target: Function<(i32,), i32> = Function::new(|x: i32| x);
    let mut source = moved;
    target.assign_from(&mut source);
    assert!(source.is_empty());
    assert_eq!(target.call((4,)), Ok(12));
}

#[test]
fn test_copies_clone_captured_state() {
    let clones = Arc::new(AtomicUsize::new(0));

    struct CountedCapture {
        clones: Arc<AtomicUsize>,
        payload: [u64; 4],
    }

    impl CountedCapture {
        fn get(&self, index: usize) -> u64 {
            self.payload[index]
        }
    }

    impl Clone for CountedCapture {
        fn clone(&self) -> Self {
            self.clones.fetch_add(1, Ordering::Relaxed);
            Self {
                clones: Arc::clone(&self.clones),
                payload: self.payload,
            }
        }
    }

    let capture = CountedCapture {
        clones: Arc::clone(&clones),
        payload: [1, 2, 3, 4],
    };
    let mut function: Function<(usize,), u64> =
        Function::new(move |index: usize| capture.get(index));
    assert_eq!(function.placement(), Some(Placement::Heap));

    let copy = function.clone();
    assert_eq!(clones.load(Ordering::Relaxed), 1);
    assert_eq!(copy.call((3,)), Ok(4));

    let mut other: Function<(usize,), u64> = Function::new(|index: usize| index as u64);
    function.swap(&mut other);
    assert_eq!(clones.load(Ordering::Relaxed), 1);
    assert_eq!(function.call((3,)), Ok(3));
    assert_eq!(other.call((0,)), Ok(1));
}

#[test]
fn test_set_and_reset() {
    let mut function: Function<(String,), usize> = Function::empty();
    function.set(|text: String| text.len());
    assert_eq!(function.call((String::from("four"),)), Ok(4));

    function.set(|text: String| text.chars().filter(|c| *c == 'o').count());
    assert_eq!(function.call((String::from("foo"),)), Ok(2));

    function.reset();
    assert!(function.is_empty());
    assert_eq!(function.call((String::from("foo"),)), Err(BadCall));
}

#[test]
fn test_target_introspection() {
    let function: Function<(i32, i32), i32> = Function::new(add as fn(i32, i32) -> i32);

    assert_eq!(function.target_type(), TypeInfo::of::<fn(i32, i32) -> i32>());
    assert_eq!(function.placement(), Some(Placement::Inline));

    let target = function.target::<fn(i32, i32) -> i32>().unwrap();
    assert_eq!(target(20, 22), 42);
    assert!(function.target::<fn(i32) -> i32>().is_none());
}

#[test]
fn test_callable_panic_propagates() {
    let function: Function<(u8,), u8> =
        Function::new(|x: u8| x.checked_sub(1).expect("callable failed"));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| function.call((0,))));
    assert!(result.is_err());
    assert_eq!(function.call((1,)), Ok(0));

    // The function itself is still intact
    assert!(function.has_target());
}

#[test]
fn test_local_function() {
    let total = Rc::new(Cell::new(0_i64));
    let sink = Rc::clone(&total);
    let function: Function<(i64,), (), Local> =
        Function::new_local(move |value: i64| sink.set(sink.get() + value));

    function.call((5,)).unwrap();
    function.clone().call((7,)).unwrap();
    assert_eq!(total.get(), 12);
}

#[test]
fn test_function_crosses_threads() {
    let function: Function<(u32,), u32> = Function::new_sendsync(|x: u32| x.pow(2));
    let copy = function.clone();

    let handle = std::thread::spawn(move || copy.call((12,)));
    assert_eq!(handle.join().unwrap(), Ok(144));
    assert_eq!(function.into_local().call((3,)), Ok(9));
}
