//! Grid parameter sets
//!
//! Two descriptions of the same channel grid exist in the wild. The info file
//! written next to exported binaries records the physical layout directly as
//! total point counts, while the solver input describes the spectral
//! discretisation with "half" counts. Mixing the two up is the classic source
//! of off-by-a-factor-of-two shapes, so the conversion lives in exactly one
//! place: [GridParams::from_dns].

// standard library
use std::f64::consts::PI;

// external crates
use serde::{Deserialize, Serialize};

/// Physical-layout grid parameters, all counts are totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Streamwise points
    pub nx_total: usize,
    /// Spanwise points
    pub nz_total: usize,
    /// Streamwise spacing
    pub dx: f64,
    /// Spanwise spacing
    pub dz: f64,
    /// Wall-normal intervals used by the stretching law
    pub ny: usize,
    /// Wall-normal points
    pub ny_total: usize,
    /// Stretching factor of the tanh law
    pub a: f64,
    /// Lower wall position
    pub ymin: f64,
    /// Upper wall position
    pub ymax: f64,
}

impl GridParams {
    /// Convert a spectral description into the physical layout
    ///
    /// The spectral modes `-nx..=nx` and `-nz..=nz` map onto `2n+1` physical
    /// points, and the wall-normal direction has `ny+1` points.
    ///
    /// ```rust
    /// # use chanpost::mesh::{DnsParams, GridParams};
    /// let dns = DnsParams { nx: 3, ny: 4, nz: 2, alfa0: 1.0, beta0: 2.0, a: 1.6, ymin: -1.0, ymax: 1.0 };
    /// let grid = GridParams::from_dns(&dns);
    /// assert_eq!((grid.nx_total, grid.ny_total, grid.nz_total), (7, 5, 5));
    /// ```
    pub fn from_dns(dns: &DnsParams) -> Self {
        let nx_total = 2 * dns.nx + 1;
        let nz_total = 2 * dns.nz + 1;
        Self {
            nx_total,
            nz_total,
            dx: 2.0 * PI / (dns.alfa0 * nx_total as f64),
            dz: 2.0 * PI / (dns.beta0 * nz_total as f64),
            ny: dns.ny,
            ny_total: dns.ny + 1,
            a: dns.a,
            ymin: dns.ymin,
            ymax: dns.ymax,
        }
    }

    /// Number of grid points, ignoring components
    pub fn number_of_points(&self) -> usize {
        self.nx_total * self.ny_total * self.nz_total
    }
}

/// Spectral grid description as found in the solver input
///
/// Reading `dns.in` itself is left to whatever produced the simulation, this
/// is only the handful of values the readers need. It deserialises from JSON
/// so a sidecar file is enough for the command line tools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DnsParams {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    /// Fundamental streamwise wavenumber
    pub alfa0: f64,
    /// Fundamental spanwise wavenumber
    pub beta0: f64,
    pub a: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl DnsParams {
    /// Streamwise wavenumbers `alfa0 * i` for `i` in `0..=nx`
    pub fn kx(&self) -> Vec<f64> {
        (0..=self.nx).map(|i| self.alfa0 * i as f64).collect()
    }

    /// Spanwise wavenumbers `beta0 * k` for `k` in `0..=nz`
    pub fn kz(&self) -> Vec<f64> {
        (0..=self.nz).map(|k| self.beta0 * k as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns() -> DnsParams {
        DnsParams {
            nx: 16,
            ny: 40,
            nz: 8,
            alfa0: 0.5,
            beta0: 2.0,
            a: 1.6,
            ymin: -1.0,
            ymax: 1.0,
        }
    }

    #[test]
    fn half_counts_become_totals() {
        let grid = GridParams::from_dns(&dns());
        assert_eq!(grid.nx_total, 33);
        assert_eq!(grid.nz_total, 17);
        assert_eq!(grid.ny, 40);
        assert_eq!(grid.ny_total, 41);
        assert_eq!(grid.number_of_points(), 33 * 41 * 17);
    }

    #[test]
    fn spacing_covers_the_periodic_box() {
        let grid = GridParams::from_dns(&dns());
        let lx = grid.dx * grid.nx_total as f64;
        let lz = grid.dz * grid.nz_total as f64;
        assert!((lx - 2.0 * PI / 0.5).abs() < 1e-12);
        assert!((lz - PI).abs() < 1e-12);
    }

    #[test]
    fn wavenumbers() {
        let dns = dns();
        let kx = dns.kx();
        let kz = dns.kz();
        assert_eq!(kx.len(), 17);
        assert_eq!(kz.len(), 9);
        assert_eq!(kx[2], 1.0);
        assert_eq!(kz[8], 16.0);
    }

    #[test]
    fn dns_params_from_json() {
        let json = r#"{"nx": 16, "ny": 40, "nz": 8, "alfa0": 0.5, "beta0": 2.0,
                       "a": 1.6, "ymin": -1.0, "ymax": 1.0}"#;
        let parsed: DnsParams = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, dns());
    }
}
