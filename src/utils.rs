//! Common small functions used throughout the crate
//!
//! Left public for convenience, mostly number formatting for the command line
//! summaries and a NaN-tolerant range helper for field data.

use std::fmt::LowerExp;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Extends primitives with more specific formatting options
pub trait NumberFmt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows easy definition of a fixed width column.
    ///
    /// ```rust
    /// # use chanpost::utils::NumberFmt;
    /// assert_eq!((-1.0).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((0.0125).sci(3, 2), "1.250e-02".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: LowerExp> NumberFmt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut num = f!("{:.precision$e}", &self, precision = precision);
        let exp = match num.find('e') {
            Some(idx) => num.split_off(idx),
            None => return num,
        };
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        num.push_str(&f!("e{}{:0>pad$}", sign, exp, pad = exp_pad));
        num
    }
}

/// Minimum and maximum of a slice of `f64`, ignoring NaN
///
/// Floats do not implement Ord, so `total_cmp` does the work. Returns `None`
/// for an empty slice or one that is entirely NaN.
///
/// ```rust
/// # use chanpost::utils::f64_range;
/// assert_eq!(f64_range(&[2.0, f64::NAN, -1.0, 3.0]), Some((-1.0, 3.0)));
/// assert_eq!(f64_range(&[]), None);
/// ```
pub fn f64_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().filter(|v| !v.is_nan());
    let first = *finite.next()?;
    Some(finite.fold((first, first), |(lo, hi), &v| {
        (
            if v.total_cmp(&lo).is_lt() { v } else { lo },
            if v.total_cmp(&hi).is_gt() { v } else { hi },
        )
    }))
}
