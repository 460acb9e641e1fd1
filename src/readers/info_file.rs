//! Reader for the grid info file written alongside exported binaries
//!
//! Plain text, two lines of whitespace separated values:
//!
//! ```text
//! nx_total nz_total dx dz
//! ny ny_total a ymin ymax
//! ```

// standard library
use std::fs;
use std::path::Path;

// internal modules
use crate::error::{Error, Result};
use crate::mesh::GridParams;
use crate::readers::parsers;

// external crates
use log::debug;

/// A simple reader for the two-line grid info file
#[derive(Debug, Default)]
pub struct InfoFileReader {}

impl InfoFileReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    pub fn parse(&self, path: &Path) -> Result<GridParams> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!("Parsing grid info from {}", path.display());
        self.parse_str(&content)
    }

    pub fn parse_str(&self, content: &str) -> Result<GridParams> {
        let mut lines = content.lines().map(str::trim);

        let first = lines.next().ok_or_else(|| missing_line(1))?;
        let (_, (nx_total, nz_total, dx, dz)) =
            parsers::info_spacing(first).map_err(|e| Error::Parse {
                line: 1,
                message: format!("expected 'nx_total nz_total dx dz' ({e})"),
            })?;

        let second = lines.next().ok_or_else(|| missing_line(2))?;
        let (_, (ny, ny_total, a, ymin, ymax)) =
            parsers::info_wall_normal(second).map_err(|e| Error::Parse {
                line: 2,
                message: format!("expected 'ny ny_total a ymin ymax' ({e})"),
            })?;

        Ok(GridParams {
            nx_total,
            nz_total,
            dx,
            dz,
            ny,
            ny_total,
            a,
            ymin,
            ymax,
        })
    }
}

fn missing_line(line: usize) -> Error {
    Error::Parse {
        line,
        message: "info file ended early, two lines are required".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_lines() {
        let grid = InfoFileReader::new()
            .parse_str("  7 5 0.5 0.25\n4 5 1.6 -1.0 1.0\n")
            .unwrap();
        assert_eq!(grid.nx_total, 7);
        assert_eq!(grid.nz_total, 5);
        assert_eq!(grid.dx, 0.5);
        assert_eq!(grid.dz, 0.25);
        assert_eq!(grid.ny, 4);
        assert_eq!(grid.ny_total, 5);
        assert_eq!(grid.a, 1.6);
        assert_eq!((grid.ymin, grid.ymax), (-1.0, 1.0));
    }

    #[test]
    fn windows_line_endings() {
        let grid = InfoFileReader::new()
            .parse_str("7 5 0.5 0.25\r\n4 5 1.6 -1.0 1.0\r\n")
            .unwrap();
        assert_eq!(grid.ny_total, 5);
    }

    #[test]
    fn errors_carry_the_line_number() {
        let reader = InfoFileReader::new();
        assert!(matches!(
            reader.parse_str("7 5 0.5 0.25\n4 5 1.6 -1.0\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            reader.parse_str("7 five 0.5 0.25\n"),
            Err(Error::Parse { line: 1, .. })
        ));
        assert!(matches!(
            reader.parse_str("7 5 0.5 0.25"),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn missing_file() {
        let result = InfoFileReader::new().parse(Path::new("no/such/info.txt"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
