// internal modules
use crate::error::{Error, Result};
use crate::mesh::GridParams;
use crate::utils::*;

// external crates
use log::trace;
use serde::Serialize;

/// Coordinates of a channel grid
///
/// Built once from [GridParams] and never modified. Changing any parameter
/// means building a new mesh with [build_mesh].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    params: GridParams,
}

impl Mesh {
    /// Streamwise coordinates
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Wall-normal coordinates
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Spanwise coordinates
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Parameters the mesh was built from
    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Point counts as `(nz, ny, nx)`, the spatial part of a field shape
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.z.len(), self.y.len(), self.x.len())
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let extent = |v: &[f64]| match (v.first(), v.last()) {
            (Some(lo), Some(hi)) => f!("{} to {}", lo.sci(4, 2), hi.sci(4, 2)),
            _ => "empty".to_string(),
        };
        writeln!(f, "Mesh {{")?;
        writeln!(f, "    x: {:>5} points, {}", self.x.len(), extent(&self.x))?;
        writeln!(f, "    y: {:>5} points, {}", self.y.len(), extent(&self.y))?;
        writeln!(f, "    z: {:>5} points, {}", self.z.len(), extent(&self.z))?;
        write!(f, "}}")
    }
}

/// Build the mesh coordinates from a set of grid parameters
///
/// Streamwise and spanwise points are uniform, `x[i] = i*dx` and `z[k] = k*dz`.
/// The wall-normal points follow the tanh stretching in [wall_normal].
///
/// ```rust
/// # use chanpost::mesh::{build_mesh, GridParams};
/// let grid = GridParams {
///     nx_total: 4, nz_total: 3, dx: 0.5, dz: 0.25,
///     ny: 4, ny_total: 5, a: 1.6, ymin: -1.0, ymax: 1.0,
/// };
/// let mesh = build_mesh(&grid).unwrap();
/// assert_eq!(mesh.x(), &[0.0, 0.5, 1.0, 1.5]);
/// assert_eq!(mesh.y().len(), 5);
/// ```
pub fn build_mesh(params: &GridParams) -> Result<Mesh> {
    let x = uniform(params.nx_total, params.dx);
    let z = uniform(params.nz_total, params.dz);
    let y = wall_normal(
        params.ny,
        params.ny_total,
        params.a,
        params.ymin,
        params.ymax,
    )?;
    trace!(
        "Built mesh with {}x{}x{} points",
        x.len(),
        y.len(),
        z.len()
    );
    Ok(Mesh {
        x,
        y,
        z,
        params: *params,
    })
}

/// Wall-normal coordinates from the tanh stretching law
///
/// `y[j] = ymin + 0.5*(ymax-ymin) * (tanh(a*(2j/ny-1))/tanh(a) + 0.5*(ymax-ymin))`
/// for `j` in `0..ny_total`.
///
/// This is the law as recorded by the exporter. It reduces to the usual
/// normalised stretching only when `ymax - ymin == 2`, which covers the
/// standard channel on `[-1, 1]`.
///
/// `ny == 0` and `a == 0` are rejected rather than producing NaN.
pub fn wall_normal(ny: usize, ny_total: usize, a: f64, ymin: f64, ymax: f64) -> Result<Vec<f64>> {
    if ny == 0 {
        return Err(Error::DegenerateGrid(
            "ny must be non-zero for the stretching law".into(),
        ));
    }
    let tanh_a = a.tanh();
    if tanh_a == 0.0 || !tanh_a.is_finite() {
        return Err(Error::DegenerateGrid(f!(
            "stretching factor a = {a} gives tanh(a) = {tanh_a}"
        )));
    }

    let half = 0.5 * (ymax - ymin);
    Ok((0..ny_total)
        .map(|j| {
            let eta = 2.0 * j as f64 / ny as f64 - 1.0;
            ymin + half * ((a * eta).tanh() / tanh_a + half)
        })
        .collect())
}

fn uniform(n: usize, spacing: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 * spacing).collect()
}
