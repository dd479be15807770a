//! Transaction retry policy.
//!
//! The engine reports each fault at the phase where it was observed and
//! never re-attempts anything on its own. Whether a failed transaction is
//! worth repeating is a caller decision (an absent device will NACK
//! forever; a device mid-way through an internal write cycle will come
//! back), so retrying is layered on top of the transaction methods rather
//! than built into them.

/// A bounded re-attempt policy for whole transactions.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Retry {
    attempts: u8,
}

impl Retry {
    /// A policy giving an operation `attempts` tries in total. Panics if
    /// `attempts` is zero.
    pub fn new(attempts: u8) -> Retry {
        match attempts {
            0 => panic!("a retry policy needs at least one attempt"),
            _ => Retry { attempts },
        }
    }

    /// A policy that runs the operation once and never retries.
    pub fn none() -> Retry {
        Retry { attempts: 1 }
    }

    /// Run `op` until it succeeds or the attempts are exhausted, returning
    /// the first success or the last failure. Each attempt must be a whole
    /// transaction; retrying an individual phase would corrupt bus framing.
    pub fn run<T, E, F: FnMut() -> Result<T, E>>(&self, mut op: F) -> Result<T, E> {
        let mut result = op();
        for _ in 1..self.attempts {
            match result {
                Ok(_) => break,
                Err(_) => result = op(),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_short_circuits() {
        let mut calls = 0;
        let result: Result<u8, ()> = Retry::new(5).run(|| {
            calls += 1;
            Ok(7)
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let result: Result<(), u8> = Retry::new(3).run(|| {
            calls += 1;
            if calls < 3 {
                Err(calls)
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Ok(()));
        assert_eq!(calls, 3);
    }

    #[test]
    fn exhaustion_returns_the_last_error() {
        let mut calls = 0;
        let result: Result<(), u8> = Retry::new(4).run(|| {
            calls += 1;
            Err(calls)
        });
        assert_eq!(result, Err(4));
    }

    #[test]
    fn none_means_a_single_attempt() {
        let mut calls = 0;
        let _: Result<(), ()> = Retry::none().run(|| {
            calls += 1;
            Err(())
        });
        assert_eq!(calls, 1);
    }

    #[test]
    #[should_panic]
    fn zero_attempts_panics() {
        Retry::new(0);
    }
}
