//! Hydrogen-helium plus heavy-element mixture.

use crate::error::{EosError, EosResult};
use crate::heavy::HeavyElementEos;
use crate::hhe::HydrogenHeliumEos;
use jv_core::timing::{Timer, eos_timing};
use std::sync::Arc;

/// Columns of one vectorised query. All slices must have the same length.
#[derive(Debug, Clone, Copy)]
pub struct EosQuery<'a> {
    pub logp: &'a [f64],
    pub logt: &'a [f64],
    /// Helium fraction Y / (X + Y)
    pub y_xy: &'a [f64],
    /// Heavy-element mass fraction
    pub z: &'a [f64],
}

impl EosQuery<'_> {
    pub fn len(&self) -> usize {
        self.logp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logp.is_empty()
    }

    fn check_lengths(&self) -> EosResult<()> {
        let n = self.logp.len();
        if self.logt.len() != n || self.y_xy.len() != n || self.z.len() != n {
            return Err(EosError::InvalidArg {
                what: "EOS query columns differ in length",
            });
        }
        Ok(())
    }
}

/// Per-point results, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EosColumns {
    /// Blended density [g cm^-3]
    pub rho: Vec<f64>,
    /// Adiabatic gradient of the H-He component
    pub grada: Vec<f64>,
    /// First adiabatic exponent of the H-He component
    pub gamma1: Vec<f64>,
    pub chi_rho: Vec<f64>,
    pub chi_t: Vec<f64>,
    /// H-He density alone
    pub rho_hhe: Vec<f64>,
    /// Heavy-element density, `None` where z == 0 (never looked up)
    pub rho_z: Vec<Option<f64>>,
}

impl EosColumns {
    fn with_capacity(n: usize) -> Self {
        Self {
            rho: Vec::with_capacity(n),
            grada: Vec::with_capacity(n),
            gamma1: Vec::with_capacity(n),
            chi_rho: Vec::with_capacity(n),
            chi_t: Vec::with_capacity(n),
            rho_hhe: Vec::with_capacity(n),
            rho_z: Vec::with_capacity(n),
        }
    }
}

/// Additive-volume rule: `1/rho = z/rho_z + (1 - z)/rho_hhe`.
///
/// `rho_z` is ignored when `z == 0`, so pure H-He points never need a
/// heavy-element density.
pub fn mixed_specific_volume(rho_hhe: f64, rho_z: f64, z: f64) -> f64 {
    if z == 0.0 {
        1.0 / rho_hhe
    } else if z == 1.0 {
        1.0 / rho_z
    } else {
        z / rho_z + (1.0 - z) / rho_hhe
    }
}

/// The EOS consumed by the structure solver.
///
/// Adiabatic gradient and gamma1 come from the H-He component only; the
/// heavy-element correction to them is neglected.
#[derive(Clone)]
pub struct MixtureEos {
    hhe: Arc<dyn HydrogenHeliumEos>,
    heavy: Arc<dyn HeavyElementEos>,
}

impl std::fmt::Debug for MixtureEos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixtureEos")
            .field("hhe", &self.hhe.name())
            .field("heavy", &self.heavy.name())
            .finish()
    }
}

impl MixtureEos {
    pub fn new(hhe: Arc<dyn HydrogenHeliumEos>, heavy: Arc<dyn HeavyElementEos>) -> Self {
        Self { hhe, heavy }
    }

    pub fn hhe(&self) -> &dyn HydrogenHeliumEos {
        self.hhe.as_ref()
    }

    pub fn heavy(&self) -> &dyn HeavyElementEos {
        self.heavy.as_ref()
    }

    /// Evaluate every point of `query`. The first failing point aborts the call.
    pub fn evaluate(&self, query: &EosQuery<'_>) -> EosResult<EosColumns> {
        query.check_lengths()?;
        let n = query.len();
        let mut out = EosColumns::with_capacity(n);

        let timer = Timer::start();
        for i in 0..n {
            let (y, z) = (query.y_xy[i], query.z[i]);
            if !(0.0..=1.0).contains(&z) {
                return Err(EosError::InvalidArg {
                    what: "z must lie in [0, 1]",
                });
            }
            let s = self.hhe.sample(query.logp[i], query.logt[i], y)?;
            let rho_hhe = 10f64.powf(s.logrho);
            out.rho_hhe.push(rho_hhe);
            out.grada.push(s.grada);
            out.gamma1.push(s.gamma1);
            out.chi_rho.push(s.chi_rho);
            out.chi_t.push(s.chi_t);
        }
        timer.record_into(&eos_timing::HHE_CALLS, n as u64);

        let timer = Timer::start();
        let mut z_points = 0u64;
        for i in 0..n {
            let z = query.z[i];
            let rho_z = if z > 0.0 {
                z_points += 1;
                Some(10f64.powf(self.heavy.logrho(query.logp[i], query.logt[i])?))
            } else {
                None
            };
            let v = mixed_specific_volume(out.rho_hhe[i], rho_z.unwrap_or(f64::NAN), z);
            let rho = 1.0 / v;
            if !(rho.is_finite() && rho > 0.0) {
                return Err(EosError::NonPhysical {
                    what: "density",
                    value: rho,
                });
            }
            if !out.grada[i].is_finite() {
                return Err(EosError::NonPhysical {
                    what: "grada",
                    value: out.grada[i],
                });
            }
            out.rho.push(rho);
            out.rho_z.push(rho_z);
        }
        if z_points > 0 {
            timer.record_into(
                &eos_timing::Z_CALLS,
                z_points * self.heavy.lookups_per_point(),
            );
        }

        Ok(out)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::heavy::IceRockBlend;
    use crate::hhe::TabulatedHHe;
    use crate::table::{PtTable, TableRow};
    use proptest::prelude::*;

    fn table(logmu: f64, stiff: f64) -> PtTable {
        let mut rows = Vec::new();
        for ip in 0..9 {
            for it in 0..6 {
                let logp = 5.0 + ip as f64;
                let logt = 2.0 + 0.5 * it as f64;
                rows.push(TableRow {
                    logrho: stiff * logp - (1.0 - stiff) * logt + logmu - 8.0 * stiff,
                    logt,
                    logp,
                    logu: 10.0,
                    logs: 0.5 * logt - 0.2 * logp,
                });
            }
        }
        PtTable::from_rows(&rows, "synthetic").unwrap()
    }

    fn tabulated_eos() -> MixtureEos {
        let hhe = TabulatedHHe::from_tables(table(0.0, 1.0), table(0.6, 1.0));
        let blend = IceRockBlend::from_tables(table(1.0, 0.3), table(1.4, 0.3), 0.5).unwrap();
        MixtureEos::new(Arc::new(hhe), Arc::new(blend))
    }

    fn bits(v: &[f64]) -> Vec<u64> {
        v.iter().map(|x| x.to_bits()).collect()
    }

    proptest! {
        #[test]
        fn repeated_evaluation_is_bit_identical(
            points in prop::collection::vec(
                (5.5_f64..12.5, 2.1_f64..4.4, 0.0_f64..=1.0, 0.0_f64..=1.0),
                1..24,
            ),
        ) {
            let eos = tabulated_eos();
            let logp: Vec<f64> = points.iter().map(|p| p.0).collect();
            let logt: Vec<f64> = points.iter().map(|p| p.1).collect();
            let y: Vec<f64> = points.iter().map(|p| p.2).collect();
            let z: Vec<f64> = points.iter().map(|p| p.3).collect();
            let query = EosQuery { logp: &logp, logt: &logt, y_xy: &y, z: &z };

            let a = eos.evaluate(&query).unwrap();
            let b = eos.evaluate(&query).unwrap();
            prop_assert_eq!(bits(&a.rho), bits(&b.rho));
            prop_assert_eq!(bits(&a.grada), bits(&b.grada));
            prop_assert_eq!(bits(&a.gamma1), bits(&b.gamma1));
            prop_assert_eq!(bits(&a.chi_rho), bits(&b.chi_rho));
            prop_assert_eq!(bits(&a.chi_t), bits(&b.chi_t));
            prop_assert_eq!(&a.rho_z, &b.rho_z);

            // A point does not depend on its neighbours in the batch.
            let last = points.len() - 1;
            let alone = eos
                .evaluate(&EosQuery {
                    logp: &logp[last..],
                    logt: &logt[last..],
                    y_xy: &y[last..],
                    z: &z[last..],
                })
                .unwrap();
            prop_assert_eq!(alone.rho[0].to_bits(), a.rho[last].to_bits());
        }
    }
}
