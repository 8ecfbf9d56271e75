//! jv-relax: outer convergence driver for giant-planet interior models.
//!
//! Provides:
//! - `RelaxConfig`, one validated structure per run, loadable from YAML
//! - `Relaxer::relax`, the outer iteration over the helium and mass knobs
//! - `RelaxedModel`, the serialisable result with an optional radial profile
//! - Jupiter and Saturn constraints with Mahalanobis scoring
//! - `run_sweep`, parallel independent runs sharing one loaded EOS
//!
//! Every failure carries an `ErrorKind` so batches can route failed runs
//! without looking at messages.

pub mod config;
pub mod driver;
pub mod error;
pub mod knobs;
pub mod observables;
pub mod result;
pub mod sweep;

pub use config::{
    EosConfig, HeavyEosConfig, OuterTolerances, RelaxConfig, ResolvedTarget, TargetConfig,
    load_yaml,
};
pub use driver::Relaxer;
pub use error::{ErrorKind, RelaxError, RelaxResult, Residuals};
pub use knobs::{KnobStep, KnobUpdater};
pub use observables::{Body, BodyPreset};
pub use result::{KnobValue, RadialProfile, RelaxedModel};
pub use sweep::{
    RunFailure, SweepAxis, SweepDefinition, SweepPoint, SweepRecord, SweepSummary,
    load_sweep_yaml, run_sweep,
};
