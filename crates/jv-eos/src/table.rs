//! Regular (log P, log T) tables.
//!
//! Table files are whitespace-separated columns
//! `logrho logt logp logu logs` (log10, cgs), one row per grid node, already
//! regularised to a rectangular grid. Axis values are matched bit-exactly:
//! every distinct `logp` must appear with every distinct `logt` exactly once.

use crate::error::{EosError, EosResult};
use std::path::{Path, PathBuf};

/// One tabulated node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow {
    pub logrho: f64,
    pub logt: f64,
    pub logp: f64,
    pub logu: f64,
    pub logs: f64,
}

/// Bilinear sample of a table, with the interpolant's partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSample {
    pub logrho: f64,
    pub logu: f64,
    pub logs: f64,
    /// (d log rho / d log P) at fixed T
    pub dlogrho_dlogp: f64,
    /// (d log rho / d log T) at fixed P
    pub dlogrho_dlogt: f64,
    /// (d log s / d log P) at fixed T
    pub dlogs_dlogp: f64,
    /// (d log s / d log T) at fixed P
    pub dlogs_dlogt: f64,
}

/// Rectangular table on strictly increasing log P and log T axes.
#[derive(Debug, Clone)]
pub struct PtTable {
    logp: Vec<f64>,
    logt: Vec<f64>,
    // Row-major: index = ip * nt + it
    logrho: Vec<f64>,
    logu: Vec<f64>,
    logs: Vec<f64>,
    source: PathBuf,
}

impl PtTable {
    /// Load a table file.
    pub fn load(path: &Path) -> EosResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EosError::init(path, format!("cannot read table: {e}")))?;
        let rows = parse_rows(&content).map_err(|reason| EosError::init(path, reason))?;
        Self::from_rows(&rows, path)
    }

    /// Build a table from rows in any order. `source` is only used for messages.
    pub fn from_rows(rows: &[TableRow], source: impl Into<PathBuf>) -> EosResult<Self> {
        let source = source.into();
        if let Some(row) = rows
            .iter()
            .find(|r| !r.logp.is_finite() || !r.logt.is_finite())
        {
            return Err(EosError::init(
                &source,
                format!("non-finite axis value: logp={} logt={}", row.logp, row.logt),
            ));
        }
        let logp = unique_axis(rows.iter().map(|r| r.logp));
        let logt = unique_axis(rows.iter().map(|r| r.logt));
        let (np, nt) = (logp.len(), logt.len());

        if np < 2 || nt < 2 {
            return Err(EosError::init(
                &source,
                "table needs at least two distinct log P and log T values",
            ));
        }
        if rows.len() != np * nt {
            return Err(EosError::init(
                &source,
                format!(
                    "not a rectangular grid: {} rows for {np} x {nt} axis values",
                    rows.len()
                ),
            ));
        }

        let mut logrho = vec![f64::NAN; np * nt];
        let mut logu = vec![f64::NAN; np * nt];
        let mut logs = vec![f64::NAN; np * nt];
        let mut filled = vec![false; np * nt];

        for row in rows {
            // Both searches succeed: the axes were built from these very values.
            let ip = logp.partition_point(|&v| v < row.logp);
            let it = logt.partition_point(|&v| v < row.logt);
            let idx = ip * nt + it;
            if filled[idx] {
                return Err(EosError::init(
                    &source,
                    format!("duplicate node at logp={} logt={}", row.logp, row.logt),
                ));
            }
            filled[idx] = true;
            logrho[idx] = row.logrho;
            logu[idx] = row.logu;
            logs[idx] = row.logs;
        }

        Ok(Self {
            logp,
            logt,
            logrho,
            logu,
            logs,
            source,
        })
    }

    pub fn logp_range(&self) -> (f64, f64) {
        (self.logp[0], self.logp[self.logp.len() - 1])
    }

    pub fn logt_range(&self) -> (f64, f64) {
        (self.logt[0], self.logt[self.logt.len() - 1])
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Bilinear lookup. Points on the outer grid lines are inside the domain.
    pub fn sample(&self, logp: f64, logt: f64) -> EosResult<TableSample> {
        let (ip, u) = locate(&self.logp, logp, "logp")?;
        let (it, v) = locate(&self.logt, logt, "logt")?;
        let dp = self.logp[ip + 1] - self.logp[ip];
        let dt = self.logt[it + 1] - self.logt[it];

        let nt = self.logt.len();
        let corners = |f: &[f64]| {
            (
                f[ip * nt + it],
                f[(ip + 1) * nt + it],
                f[ip * nt + it + 1],
                f[(ip + 1) * nt + it + 1],
            )
        };

        let value = |(f00, f10, f01, f11): (f64, f64, f64, f64)| {
            (1.0 - u) * (1.0 - v) * f00 + u * (1.0 - v) * f10 + (1.0 - u) * v * f01 + u * v * f11
        };
        let d_dp = |(f00, f10, f01, f11): (f64, f64, f64, f64)| {
            ((1.0 - v) * (f10 - f00) + v * (f11 - f01)) / dp
        };
        let d_dt = |(f00, f10, f01, f11): (f64, f64, f64, f64)| {
            ((1.0 - u) * (f01 - f00) + u * (f11 - f10)) / dt
        };

        let rho = corners(&self.logrho);
        let s = corners(&self.logs);
        Ok(TableSample {
            logrho: value(rho),
            logu: value(corners(&self.logu)),
            logs: value(s),
            dlogrho_dlogp: d_dp(rho),
            dlogrho_dlogt: d_dt(rho),
            dlogs_dlogp: d_dp(s),
            dlogs_dlogt: d_dt(s),
        })
    }
}

fn parse_rows(content: &str) -> Result<Vec<TableRow>, String> {
    let mut rows = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cols = [0.0_f64; 5];
        let mut fields = line.split_whitespace();
        for (i, col) in cols.iter_mut().enumerate() {
            let field = fields
                .next()
                .ok_or_else(|| format!("line {}: expected 5 columns, found {i}", lineno + 1))?;
            *col = field
                .parse()
                .map_err(|e| format!("line {}: bad number {field:?}: {e}", lineno + 1))?;
        }
        rows.push(TableRow {
            logrho: cols[0],
            logt: cols[1],
            logp: cols[2],
            logu: cols[3],
            logs: cols[4],
        });
    }
    if rows.is_empty() {
        return Err("table contains no data rows".to_string());
    }
    Ok(rows)
}

fn unique_axis(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.collect();
    axis.sort_by(f64::total_cmp);
    axis.dedup();
    axis
}

/// Cell index `i` with `axis[i] <= x <= axis[i+1]` and the fractional offset.
fn locate(axis: &[f64], x: f64, what: &'static str) -> EosResult<(usize, f64)> {
    let n = axis.len();
    let (min, max) = (axis[0], axis[n - 1]);
    // Also rejects NaN.
    if !(x >= min && x <= max) {
        return Err(EosError::OutOfRange {
            what,
            value: x,
            min,
            max,
        });
    }
    let i = axis.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2);
    let frac = (x - axis[i]) / (axis[i + 1] - axis[i]);
    Ok((i, frac))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// logrho = 0.5 logp - 0.1 logt, logs = 0.3 logt - 0.05 logp on a 3x3 grid.
    fn planar_rows() -> Vec<TableRow> {
        let mut rows = Vec::new();
        for &logp in &[6.0, 8.0, 10.0] {
            for &logt in &[2.0, 3.0, 4.0] {
                rows.push(TableRow {
                    logrho: 0.5 * logp - 0.1 * logt - 5.0,
                    logt,
                    logp,
                    logu: 10.0 + 0.1 * logt,
                    logs: 8.0 + 0.3 * logt - 0.05 * logp,
                });
            }
        }
        rows
    }

    #[test]
    fn planar_data_interpolates_exactly() {
        let table = PtTable::from_rows(&planar_rows(), "planar").unwrap();
        let s = table.sample(7.3, 2.6).unwrap();
        assert!((s.logrho - (0.5 * 7.3 - 0.1 * 2.6 - 5.0)).abs() < 1e-12);
        assert!((s.dlogrho_dlogp - 0.5).abs() < 1e-12);
        assert!((s.dlogrho_dlogt + 0.1).abs() < 1e-12);
        assert!((s.dlogs_dlogp + 0.05).abs() < 1e-12);
        assert!((s.dlogs_dlogt - 0.3).abs() < 1e-12);
    }

    #[test]
    fn grid_edges_are_inside() {
        let table = PtTable::from_rows(&planar_rows(), "planar").unwrap();
        assert!(table.sample(6.0, 2.0).is_ok());
        assert!(table.sample(10.0, 4.0).is_ok());
    }

    #[test]
    fn outside_grid_is_out_of_range() {
        let table = PtTable::from_rows(&planar_rows(), "planar").unwrap();
        let err = table.sample(5.9, 3.0).unwrap_err();
        assert!(matches!(err, EosError::OutOfRange { what: "logp", .. }));
        let err = table.sample(8.0, 4.5).unwrap_err();
        assert!(matches!(err, EosError::OutOfRange { what: "logt", .. }));
        assert!(table.sample(f64::NAN, 3.0).is_err());
    }

    #[test]
    fn ragged_grid_rejected() {
        let mut rows = planar_rows();
        rows.pop();
        let err = PtTable::from_rows(&rows, "ragged").unwrap_err();
        assert!(matches!(err, EosError::Initialization { .. }));
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut rows = planar_rows();
        let n = rows.len();
        rows[n - 1] = rows[0];
        // Same count, but one node is missing and another doubled.
        assert!(PtTable::from_rows(&rows, "dup").is_err());
    }

    #[test]
    fn parse_skips_comments_and_reports_bad_lines() {
        let rows = parse_rows("# header\n\n-1 2 6 10 8\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].logp, 6.0);
        assert!(parse_rows("-1 2 6\n").is_err());
        assert!(parse_rows("-1 2 six 10 8\n").is_err());
    }

    #[test]
    fn missing_file_is_initialization_error() {
        let err = PtTable::load(Path::new("/definitely/not/here.dat")).unwrap_err();
        assert!(matches!(err, EosError::Initialization { .. }));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lookup_is_idempotent(logp in 6.0_f64..10.0, logt in 2.0_f64..4.0) {
            let table = PtTable::from_rows(&tests_rows(), "idem").unwrap();
            let a = table.sample(logp, logt).unwrap();
            let b = table.sample(logp, logt).unwrap();
            prop_assert_eq!(a.logrho.to_bits(), b.logrho.to_bits());
            prop_assert_eq!(a.logs.to_bits(), b.logs.to_bits());
            prop_assert_eq!(a.dlogrho_dlogp.to_bits(), b.dlogrho_dlogp.to_bits());
        }
    }

    fn tests_rows() -> Vec<TableRow> {
        let mut rows = Vec::new();
        for ip in 0..5 {
            for it in 0..4 {
                let logp = 6.0 + ip as f64;
                let logt = 2.0 + it as f64 * 2.0 / 3.0;
                rows.push(TableRow {
                    logrho: (0.4 * logp).sin() - 0.2 * logt,
                    logt,
                    logp,
                    logu: logt,
                    logs: 0.1 * logp * logt,
                });
            }
        }
        rows
    }
}
