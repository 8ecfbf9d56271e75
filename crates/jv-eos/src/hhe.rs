//! Hydrogen-helium EOS.

use crate::error::{EosError, EosResult};
use crate::table::PtTable;
use std::path::Path;

/// Hydrogen-helium properties at one (P, T, Y/(X+Y)) point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HHeSample {
    pub logrho: f64,
    /// Adiabatic temperature gradient (d ln T / d ln P)_s
    pub grada: f64,
    /// First adiabatic exponent (d ln P / d ln rho)_s
    pub gamma1: f64,
    /// (d ln P / d ln rho)_T
    pub chi_rho: f64,
    /// (d ln P / d ln T)_rho
    pub chi_t: f64,
}

/// Trait for hydrogen-helium EOS backends.
///
/// Implementations must be thread-safe (Send + Sync): one instance is shared
/// read-only across every model and sweep worker.
pub trait HydrogenHeliumEos: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Properties at (log10 P [dyn cm^-2], log10 T [K]) for helium fraction
    /// `y_xy = Y / (X + Y)`.
    fn sample(&self, logp: f64, logt: f64, y_xy: f64) -> EosResult<HHeSample>;
}

/// Hydrogen and helium tables mixed on the fly.
///
/// Densities combine by additive volume in Y. Entropy is mass-weighted
/// (ideal mixing entropy neglected), which fixes the adiabatic gradient;
/// gamma1 follows from the mixture's chi_rho and chi_T.
#[derive(Debug, Clone)]
pub struct TabulatedHHe {
    hydrogen: PtTable,
    helium: PtTable,
}

impl TabulatedHHe {
    pub const HYDROGEN_FILE: &'static str = "hhe/h_pt.dat";
    pub const HELIUM_FILE: &'static str = "hhe/he_pt.dat";

    /// Load `hhe/h_pt.dat` and `hhe/he_pt.dat` below the EOS data directory.
    pub fn load(data_dir: &Path) -> EosResult<Self> {
        let hydrogen = PtTable::load(&data_dir.join(Self::HYDROGEN_FILE))?;
        let helium = PtTable::load(&data_dir.join(Self::HELIUM_FILE))?;
        Ok(Self::from_tables(hydrogen, helium))
    }

    pub fn from_tables(hydrogen: PtTable, helium: PtTable) -> Self {
        Self { hydrogen, helium }
    }
}

impl HydrogenHeliumEos for TabulatedHHe {
    fn name(&self) -> &str {
        "tabulated H/He"
    }

    fn sample(&self, logp: f64, logt: f64, y_xy: f64) -> EosResult<HHeSample> {
        if !(0.0..=1.0).contains(&y_xy) {
            return Err(EosError::InvalidArg {
                what: "y_xy must lie in [0, 1]",
            });
        }
        let h = self.hydrogen.sample(logp, logt)?;
        let he = self.helium.sample(logp, logt)?;
        let (x, y) = (1.0 - y_xy, y_xy);

        // Specific volumes weight the density derivatives.
        let v_h = x * 10f64.powf(-h.logrho);
        let v_he = y * 10f64.powf(-he.logrho);
        let v = v_h + v_he;
        let dlnrho_dlnp = (v_h * h.dlogrho_dlogp + v_he * he.dlogrho_dlogp) / v;
        let dlnrho_dlnt = (v_h * h.dlogrho_dlogt + v_he * he.dlogrho_dlogt) / v;

        // Entropies weight the entropy derivatives; the ln 10 factors cancel.
        let s_h = x * 10f64.powf(h.logs);
        let s_he = y * 10f64.powf(he.logs);
        let ds_dlnp = s_h * h.dlogs_dlogp + s_he * he.dlogs_dlogp;
        let ds_dlnt = s_h * h.dlogs_dlogt + s_he * he.dlogs_dlogt;

        let grada = -ds_dlnp / ds_dlnt;
        let chi_rho = 1.0 / dlnrho_dlnp;
        let chi_t = -dlnrho_dlnt / dlnrho_dlnp;
        let gamma1 = chi_rho / (1.0 - chi_t * grada);

        Ok(HHeSample {
            logrho: -v.log10(),
            grada,
            gamma1,
            chi_rho,
            chi_t,
        })
    }
}
