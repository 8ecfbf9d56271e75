//! jv-core: shared foundation for the jovian interior solver.
//!
//! Contains:
//! - units (uom SI types, SI -> cgs conversion, physical constants)
//! - numeric (Real + finiteness checks + relative change)
//! - timing (EOS call counters)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{JvError, JvResult};
pub use numeric::*;
pub use units::*;
