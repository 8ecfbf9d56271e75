//! Heavy-element EOS: a single material or an ice/rock blend.

use crate::error::{EosError, EosResult};
use crate::table::PtTable;
use std::fmt;
use std::path::{Path, PathBuf};

/// Tabulated heavy-element materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// Water ice
    Ice,
    /// Serpentine, standing in for silicate rock
    Serpentine,
}

impl Material {
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Ice => "ice",
            Self::Serpentine => "serpentine",
        }
    }

    /// Table path below the data directory. Extended tables reach higher pressure.
    pub fn table_path(self, data_dir: &Path, extended: bool) -> PathBuf {
        let suffix = if extended { "_hi-p" } else { "" };
        data_dir
            .join("z")
            .join(format!("{}_pt{suffix}.dat", self.file_stem()))
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Trait for heavy-element EOS backends.
///
/// Only density is consumed: the adiabatic gradient of the blend is taken from
/// the hydrogen-helium component.
pub trait HeavyElementEos: Send + Sync {
    fn name(&self) -> &str;

    /// log10 density [g cm^-3] at (log10 P, log10 T).
    fn logrho(&self, logp: f64, logt: f64) -> EosResult<f64>;

    /// Table lookups per call (1 for a pure material, 2 for a blend).
    fn lookups_per_point(&self) -> u64 {
        1
    }
}

/// One tabulated material: a single interpolation per point.
#[derive(Debug, Clone)]
pub struct PureMaterial {
    material: Material,
    table: PtTable,
    name: String,
}

impl PureMaterial {
    pub fn load(data_dir: &Path, material: Material, extended: bool) -> EosResult<Self> {
        let table = PtTable::load(&material.table_path(data_dir, extended))?;
        Ok(Self::from_table(material, table))
    }

    pub fn from_table(material: Material, table: PtTable) -> Self {
        Self {
            material,
            table,
            name: format!("pure {material}"),
        }
    }

    pub fn material(&self) -> Material {
        self.material
    }
}

impl HeavyElementEos for PureMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn logrho(&self, logp: f64, logt: f64) -> EosResult<f64> {
        Ok(self.table.sample(logp, logt)?.logrho)
    }
}

/// Ice and rock blended on the fly by additive volume:
/// `1/rho = f_ice/rho_ice + (1 - f_ice)/rho_rock`.
#[derive(Debug, Clone)]
pub struct IceRockBlend {
    ice: PtTable,
    rock: PtTable,
    f_ice: f64,
    name: String,
}

impl IceRockBlend {
    pub fn load(data_dir: &Path, f_ice: f64, extended: bool) -> EosResult<Self> {
        let ice = PtTable::load(&Material::Ice.table_path(data_dir, extended))?;
        let rock = PtTable::load(&Material::Serpentine.table_path(data_dir, extended))?;
        Self::from_tables(ice, rock, f_ice)
    }

    pub fn from_tables(ice: PtTable, rock: PtTable, f_ice: f64) -> EosResult<Self> {
        if !(0.0..=1.0).contains(&f_ice) {
            return Err(EosError::InvalidArg {
                what: "f_ice must lie in [0, 1]",
            });
        }
        Ok(Self {
            ice,
            rock,
            f_ice,
            name: format!("ice/rock blend (f_ice={f_ice})"),
        })
    }

    pub fn f_ice(&self) -> f64 {
        self.f_ice
    }
}

impl HeavyElementEos for IceRockBlend {
    fn name(&self) -> &str {
        &self.name
    }

    fn logrho(&self, logp: f64, logt: f64) -> EosResult<f64> {
        let rho_ice = 10f64.powf(self.ice.sample(logp, logt)?.logrho);
        let rho_rock = 10f64.powf(self.rock.sample(logp, logt)?.logrho);
        let v = self.f_ice / rho_ice + (1.0 - self.f_ice) / rho_rock;
        Ok(-v.log10())
    }

    fn lookups_per_point(&self) -> u64 {
        2
    }
}
