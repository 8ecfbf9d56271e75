//! jv-eos: equation-of-state service for giant-planet interiors.
//!
//! Provides:
//! - Regular (log P, log T) tables with bilinear lookup
//! - Hydrogen-helium mixture EOS (`HydrogenHeliumEos`)
//! - Heavy-element EOS, pure material or ice/rock blend (`HeavyElementEos`)
//! - `MixtureEos`, the additive-volume blend consumed by the structure solver
//! - Analytic polytropic stand-ins for table-free runs
//!
//! # Architecture
//!
//! The two component traits isolate the solver from where densities come from.
//! Tables are loaded once and shared read-only (`Arc`) by every model and
//! every worker of a sweep; nothing here mutates after construction.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use jv_eos::{EosQuery, MixtureEos, PolytropicHHe, PolytropicZ};
//!
//! let eos = MixtureEos::new(Arc::new(PolytropicHHe::default()), Arc::new(PolytropicZ::default()));
//! let cols = eos
//!     .evaluate(&EosQuery {
//!         logp: &[12.0],
//!         logt: &[4.0],
//!         y_xy: &[0.275],
//!         z: &[0.02],
//!     })
//!     .unwrap();
//! assert!(cols.rho[0] > 0.0);
//! ```

pub mod analytic;
pub mod data_dir;
pub mod error;
pub mod heavy;
pub mod hhe;
pub mod mixture;
pub mod table;

pub use analytic::{PolytropicHHe, PolytropicZ};
pub use data_dir::{DATA_DIR_ENV, resolve_data_dir};
pub use error::{EosError, EosResult};
pub use heavy::{HeavyElementEos, IceRockBlend, Material, PureMaterial};
pub use hhe::{HHeSample, HydrogenHeliumEos, TabulatedHHe};
pub use mixture::{EosColumns, EosQuery, MixtureEos, mixed_specific_volume};
pub use table::{PtTable, TableRow, TableSample};
