//! Channel mesh construction
//!
//! # Overview
//!
//! The computational grid is uniform in the streamwise (`x`) and spanwise
//! (`z`) directions and stretched towards the walls in the wall-normal (`y`)
//! direction. Everything needed to rebuild it is a handful of scalars, held in
//! [GridParams].
//!
//! ```rust
//! use chanpost::mesh::{build_mesh, DnsParams, GridParams};
//!
//! let dns = DnsParams { nx: 8, ny: 20, nz: 4, alfa0: 1.0, beta0: 2.0, a: 1.6, ymin: -1.0, ymax: 1.0 };
//! let mesh = build_mesh(&GridParams::from_dns(&dns)).unwrap();
//!
//! assert_eq!(mesh.x().len(), 17);
//! assert_eq!(mesh.y().len(), 21);
//! assert_eq!(mesh.z().len(), 9);
//! ```
//!
//! Grid parameters usually come from the info file written by the binary
//! exporter, see [read_info_file](crate::readers::read_info_file).

// Split into subfiles for development, but anything important is re-exported
mod core;
mod grid;

#[doc(inline)]
pub use crate::mesh::core::{build_mesh, wall_normal, Mesh};

#[doc(inline)]
pub use crate::mesh::grid::{DnsParams, GridParams};
