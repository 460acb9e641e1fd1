//! # The Chanpost crate
//!
//! Post-processing tools for channel-flow direct numerical simulation output
//!
//! ## Installation
//!
//! Direct install from the repository:
//!
//! ```shell
//! cargo install --path .
//! ```
//!
//! ## Overview
//!
//! The crate covers the two tedious parts of looking at a pile of channel
//! flow runs: getting the raw binary dumps into arrays on the right mesh, and
//! keeping the scalar results of every run in one place to compare them.
//!
//! | Command line | Description                                              |
//! | ------------ | -------------------------------------------------------- |
//! | `fieldinfo`  | Inspect a binary field dump and its mesh                 |
//! | `dbdns`      | Inspect, compare, and update a simulation database       |
//!
//! Both tools are documented with detailed `--help` messages.
//!
//! ### Supported binary conventions
//!
//! The binaries have no header at all, so the tool that wrote them decides the
//! axis order. This is always given explicitly.
//!
//! | Convention                                  | File order                    |
//! | ------------------------------------------- | ----------------------------- |
//! | [Convention::Brutalbin](crate::readers::Convention) | `(z, y, x, component)` |
//! | [Convention::Channel](crate::readers::Convention)   | `(component, z, y, x)` |
//!
//! Power spectral density dumps have their own `(component, y, z, x)` order
//! and a dedicated reader, see [read_psd](crate::readers::read_psd).
//!
//! ## Advanced use
//!
//! Reading a field is a one-liner, and gives back the mesh alongside it:
//!
//! ```rust
//! use chanpost::field::FieldView;
//! use chanpost::mesh::GridParams;
//! use chanpost::readers::{read_field, Convention, GridSource, Mode};
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("u.bin");
//! # let bytes: Vec<u8> = (0..3 * 2 * 3 * 2).flat_map(|v| (v as f64).to_ne_bytes()).collect();
//! # std::fs::write(&path, bytes).unwrap();
//!
//! let grid = GridParams {
//!     nx_total: 2, nz_total: 2, dx: 0.5, dz: 0.5,
//!     ny: 2, ny_total: 3, a: 1.6, ymin: -1.0, ymax: 1.0,
//! };
//! let (field, mesh) = read_field(&path, &GridSource::Params(grid), Convention::Channel, Mode::Lazy).unwrap();
//!
//! assert_eq!(field.value([1, 0, 0, 0]).unwrap(), 12.0);
//! assert_eq!(mesh.y().len(), 3);
//! ```
//!
//! As an overview:
//! - The [mesh] module builds the stretched channel mesh from grid parameters.
//! - The [field] module holds decoded arrays, in memory or memory mapped.
//! - The [readers] module decodes binaries and the small text inputs.
//! - The [database] module loads, sanitises and saves the simulation database.
//! - The [compare] module lines up metrics across every run in a database.
//! - The [memory] module checks reads against a memory budget.
//!
//! In the background, `nom` parses the text inputs, `memmap2` backs the lazy
//! reads, `serde_json` handles the database, and `clap` the command line.

// Public facing modules
pub mod compare;
pub mod database;
pub mod field;
pub mod memory;
pub mod mesh;
pub mod readers;
pub mod utils;

mod error;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::{Error, Result};

#[doc(inline)]
pub use crate::readers::{read_field, read_info_file, read_integrals, read_psd};
