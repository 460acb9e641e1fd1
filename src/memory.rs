//! Memory checks before materialising large binaries
//!
//! Full-resolution fields and spectra can easily be larger than the machine
//! running the post-processing. Readers accept a [MemoryBudget] and ask it
//! before allocating, so the system does not quietly start swapping.
//!
//! The default is [Unchecked], which never refuses anything. A fixed limit is
//! available through [FixedBudget], and anything smarter (querying the OS,
//! sharing a budget between threads) only has to implement the trait.
//!
//! ```rust
//! # use chanpost::memory::{FixedBudget, MemoryBudget};
//! let budget = FixedBudget::from_mib(1);
//! assert!(budget.check(1024).is_ok());
//! assert!(budget.check(2 * 1024 * 1024).is_err());
//! ```

// internal modules
use crate::error::{Error, Result};

// external crates
use log::debug;

/// Decides whether a read of a given size may go ahead
pub trait MemoryBudget: std::fmt::Debug {
    /// Returns an error if `bytes` should not be allocated
    fn check(&self, bytes: u64) -> Result<()>;
}

/// No limit at all
#[derive(Debug, Default, Clone, Copy)]
pub struct Unchecked;

impl MemoryBudget for Unchecked {
    fn check(&self, _bytes: u64) -> Result<()> {
        Ok(())
    }
}

/// Hard upper limit in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBudget(pub u64);

impl FixedBudget {
    /// Budget given in mebibytes, as taken on the command line
    pub fn from_mib(mib: u64) -> Self {
        Self(mib.saturating_mul(1024 * 1024))
    }
}

impl MemoryBudget for FixedBudget {
    fn check(&self, bytes: u64) -> Result<()> {
        debug!("Memory check: {bytes} of {} bytes", self.0);
        if bytes > self.0 {
            return Err(Error::MemoryBudget {
                required: bytes,
                available: self.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchecked_allows_anything() {
        assert!(Unchecked.check(u64::MAX).is_ok());
    }

    #[test]
    fn fixed_budget_boundary() {
        let budget = FixedBudget(800);
        assert!(budget.check(800).is_ok());
        match budget.check(801) {
            Err(Error::MemoryBudget {
                required,
                available,
            }) => {
                assert_eq!(required, 801);
                assert_eq!(available, 800);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
