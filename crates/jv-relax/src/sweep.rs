//! Parallel parameter sweeps over independent relaxations.
//!
//! Every run owns its composition model and figure solver; only the loaded
//! EOS is shared. A failed run is recorded with its kind and parameters and
//! never stops the others.

use crate::config::RelaxConfig;
use crate::driver::Relaxer;
use crate::error::{ErrorKind, RelaxError, RelaxResult, Residuals};
use crate::result::RelaxedModel;
use jv_eos::MixtureEos;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// One swept setting: a dotted path into the run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAxis {
    /// e.g. `model.z1` or `perturbation.amplitude`
    pub parameter: String,
    pub values: Vec<f64>,
}

/// Base configuration plus axes; runs cover the full Cartesian product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDefinition {
    pub base: RelaxConfig,
    pub axes: Vec<SweepAxis>,
}

impl SweepDefinition {
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand to one configuration per grid point, with its parameter vector.
    pub fn expand(&self) -> RelaxResult<Vec<SweepPoint>> {
        let base = serde_yaml::to_value(&self.base)?;
        let mut points = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let mut value = base.clone();
            let mut parameters = Vec::with_capacity(self.axes.len());
            let mut stride = index;
            for axis in &self.axes {
                let v = axis.values[stride % axis.values.len()];
                stride /= axis.values.len();
                set_path(&mut value, &axis.parameter, v)?;
                parameters.push((axis.parameter.clone(), v));
            }
            let config: RelaxConfig = serde_yaml::from_value(value)?;
            points.push(SweepPoint {
                index,
                parameters,
                config,
            });
        }
        Ok(points)
    }
}

fn set_path(root: &mut Value, path: &str, v: f64) -> RelaxResult<()> {
    let keys: Vec<&str> = path.split('.').collect();
    set_keys(root, &keys, v).map_err(|key| {
        RelaxError::invalid(format!("sweep path {path}: parent of {key} is not a map"))
    })
}

fn set_keys<'k>(node: &mut Value, keys: &[&'k str], v: f64) -> Result<(), &'k str> {
    let Some((&key, rest)) = keys.split_first() else {
        return Err("");
    };
    let map = node.as_mapping_mut().ok_or(key)?;
    if rest.is_empty() {
        map.insert(Value::from(key), Value::from(v));
        return Ok(());
    }
    let child = map
        .entry(Value::from(key))
        .or_insert(Value::Mapping(Mapping::new()));
    set_keys(child, rest, v)
}

/// One expanded run.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub index: usize,
    pub parameters: Vec<(String, f64)>,
    pub config: RelaxConfig,
}

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residuals: Option<Residuals>,
}

impl From<&RelaxError> for RunFailure {
    fn from(err: &RelaxError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            residuals: err.residuals().copied(),
        }
    }
}

/// Result of one run, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub index: usize,
    pub parameters: Vec<(String, f64)>,
    pub outcome: Result<RelaxedModel, RunFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub records: Vec<SweepRecord>,
    /// Indices of failed runs per kind
    pub failures: BTreeMap<ErrorKind, Vec<usize>>,
}

impl SweepSummary {
    pub fn num_successful(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn num_failed(&self) -> usize {
        self.records.len() - self.num_successful()
    }

    pub fn converged(&self) -> impl Iterator<Item = (&SweepRecord, &RelaxedModel)> {
        self.records
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().map(|m| (r, m)))
    }
}

/// Relax every point in parallel on the shared `eos`.
pub fn run_sweep(points: Vec<SweepPoint>, eos: Arc<MixtureEos>) -> SweepSummary {
    let mut records: Vec<SweepRecord> = points
        .into_par_iter()
        .map(|point| {
            let outcome = Relaxer::with_eos(point.config, Arc::clone(&eos))
                .and_then(|mut relaxer| relaxer.relax());
            let outcome = outcome.map_err(|err| {
                warn!(
                    index = point.index,
                    kind = %err.kind(),
                    parameters = ?point.parameters,
                    error = %err,
                    "sweep run failed"
                );
                RunFailure::from(&err)
            });
            SweepRecord {
                index: point.index,
                parameters: point.parameters,
                outcome,
            }
        })
        .collect();
    records.sort_by_key(|r| r.index);

    let mut failures: BTreeMap<ErrorKind, Vec<usize>> = BTreeMap::new();
    for r in &records {
        if let Err(f) = &r.outcome {
            failures.entry(f.kind).or_default().push(r.index);
        }
    }
    SweepSummary { records, failures }
}

/// Load a sweep definition from YAML.
pub fn load_sweep_yaml(path: &Path) -> RelaxResult<SweepDefinition> {
    let content = std::fs::read_to_string(path)?;
    let def: SweepDefinition = serde_yaml::from_str(&content)?;
    def.base.validate()?;
    if def.axes.iter().any(|a| a.values.is_empty()) {
        return Err(RelaxError::invalid("sweep axis without values"));
    }
    Ok(def)
}
