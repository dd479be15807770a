//! Provides mutual exclusion for various environments.

/// Any type that can implement `BusMutex` can be used to arbitrate access to
/// the bus from multiple device handles. The lock must be held for the full
/// extent of a transaction (start through stop), since partial interleaving
/// corrupts bus framing.
///
/// If the `std` feature is enabled, then `BusMutex` is implemented for
/// `std::sync::Mutex`. If `atmega328p` is enabled, then `BusMutex` is
/// implemented for `avr_device::interrupt::Mutex<core::cell::RefCell>` (the
/// `RefCell` is needed to add mutability which the mutex does not provide).
///
/// If either of these features is enabled, then the type alias
/// [`DefaultMutex<T>`] will point to the corresponding mutex type to use.
pub trait BusMutex<T> {
    /// Construct a new instance of this mutex containing the value `v`.
    fn new(v: T) -> Self;

    /// Lock the mutex and call the closure `f` as a critical section, passing
    /// a mutable reference to the owned value. Returns the value returned by
    /// `f`.
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "std")]
pub type DefaultMutex<T> = std::sync::Mutex<T>;

#[cfg(feature = "atmega328p")]
pub type DefaultMutex<T> = avr_device::interrupt::Mutex<core::cell::RefCell<T>>;

#[cfg(feature = "std")]
impl<T> BusMutex<T> for std::sync::Mutex<T> {
    fn new(v: T) -> Self {
        std::sync::Mutex::new(v)
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let mut v = self.lock().unwrap();
        f(&mut v)
    }
}

#[cfg(feature = "atmega328p")]
impl<T> BusMutex<T> for avr_device::interrupt::Mutex<core::cell::RefCell<T>> {
    fn new(v: T) -> Self {
        avr_device::interrupt::Mutex::new(core::cell::RefCell::new(v))
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        avr_device::interrupt::free(|cs| {
            let mut v = self.borrow(cs).borrow_mut();
            f(&mut v)
        })
    }
}
