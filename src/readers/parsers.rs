//! Nom parsers for the small text inputs
//!
//! Every line parser expects a single line with surrounding whitespace already
//! trimmed, and fails if anything unexpected is left over.

// external crates
use nom::bytes::complete::take_till1;
use nom::character::complete::{space0, space1, u64 as unsigned};
use nom::combinator::{all_consuming, map, opt, rest};
use nom::multi::many1;
use nom::number::complete::double;
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

/// Unsigned integer with optional leading whitespace
fn count(i: &str) -> IResult<&str, usize> {
    map(preceded(space0, unsigned), |v| v as usize)(i)
}

/// Floating point number with optional leading whitespace
fn real(i: &str) -> IResult<&str, f64> {
    preceded(space0, double)(i)
}

/// Anything after the expected fields must be whitespace separated
fn trailing(i: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(space1, rest))(i)
}

/// First line of an info file: `nx_total nz_total dx dz`
pub fn info_spacing(i: &str) -> IResult<&str, (usize, usize, f64, f64)> {
    all_consuming(terminated(tuple((count, count, real, real)), trailing))(i)
}

/// Second line of an info file: `ny ny_total a ymin ymax`
pub fn info_wall_normal(i: &str) -> IResult<&str, (usize, usize, f64, f64, f64)> {
    all_consuming(terminated(
        tuple((count, count, real, real, real)),
        trailing,
    ))(i)
}

/// Whitespace separated column names
pub fn column_names(i: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(terminated(
        many1(preceded(space0, take_till1(|c: char| c.is_whitespace()))),
        space0,
    ))(i)
}

/// Whitespace separated row of numbers
pub fn number_row(i: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(terminated(many1(real), space0))(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_line() {
        let (_, parsed) = info_spacing("65 33 0.1 2.5e-2").unwrap();
        assert_eq!(parsed, (65, 33, 0.1, 0.025));
    }

    #[test]
    fn spacing_line_with_extra_fields() {
        let (_, parsed) = info_spacing("65\t33   0.1 0.2 trailing stuff").unwrap();
        assert_eq!(parsed, (65, 33, 0.1, 0.2));
    }

    #[test]
    fn counts_must_be_integers() {
        assert!(info_spacing("65.0 33 0.1 0.2").is_err());
        assert!(info_spacing("65 33 0.1").is_err());
        assert!(info_spacing("65 33 0.1 0.2x").is_err());
    }

    #[test]
    fn wall_normal_line() {
        let (_, parsed) = info_wall_normal("40 41 1.6 -1.0 1.0").unwrap();
        assert_eq!(parsed, (40, 41, 1.6, -1.0, 1.0));
    }

    #[test]
    fn columns_and_numbers() {
        let (_, names) = column_names("prod  diss\tturb ").unwrap();
        assert_eq!(names, vec!["prod", "diss", "turb"]);

        let (_, row) = number_row("1.0 -2.5e-3  4").unwrap();
        assert_eq!(row, vec![1.0, -2.5e-3, 4.0]);
        assert!(number_row("1.0 abc").is_err());
    }
}
