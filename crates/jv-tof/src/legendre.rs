//! Even Legendre polynomials and Gauss-Legendre quadrature on mu = cos(theta).

use std::f64::consts::PI;

/// Number of even harmonics carried: P0, P2, P4, P6, P8.
pub const N_HARMONICS: usize = 5;

/// Gauss-Legendre nodes on [-1, 1].
pub const DEFAULT_NODES: usize = 48;

/// `[P0, P2, P4, P6, P8](mu)` by Bonnet's recurrence.
pub fn even_legendre(mu: f64) -> [f64; N_HARMONICS] {
    let mut out = [0.0; N_HARMONICS];
    let (mut p_prev, mut p) = (1.0, mu);
    out[0] = 1.0;
    for l in 1..2 * (N_HARMONICS - 1) {
        let lf = l as f64;
        let next = ((2.0 * lf + 1.0) * mu * p - lf * p_prev) / (lf + 1.0);
        p_prev = p;
        p = next;
        if (l + 1) % 2 == 0 {
            out[(l + 1) / 2] = p;
        }
    }
    out
}

/// Nodes and weights of the n-point Gauss-Legendre rule, nodes descending.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    let nf = n as f64;
    for i in 0..n {
        let mut x = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..100 {
            let (mut p0, mut p1) = (1.0, x);
            for l in 1..n {
                let lf = l as f64;
                let p2 = ((2.0 * lf + 1.0) * x * p1 - lf * p0) / (lf + 1.0);
                p0 = p1;
                p1 = p2;
            }
            dp = nf * (x * p1 - p0) / (x * x - 1.0);
            let dx = p1 / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        nodes.push(x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }
    (nodes, weights)
}

/// Quadrature for integrands even in mu: positive nodes, weights doubled,
/// with the even Legendre values tabulated at each node.
#[derive(Debug, Clone)]
pub struct EvenQuadrature {
    pub mu: Vec<f64>,
    pub weight: Vec<f64>,
    pub legendre: Vec<[f64; N_HARMONICS]>,
}

impl EvenQuadrature {
    /// `n` must be even so that no node sits at mu = 0.
    pub fn new(n: usize) -> Self {
        let (nodes, weights) = gauss_legendre(n);
        let mut mu = Vec::with_capacity(n / 2);
        let mut weight = Vec::with_capacity(n / 2);
        for (x, w) in nodes.into_iter().zip(weights) {
            if x > 0.0 {
                mu.push(x);
                weight.push(2.0 * w);
            }
        }
        let legendre = mu.iter().map(|&x| even_legendre(x)).collect();
        Self {
            mu,
            weight,
            legendre,
        }
    }

    pub fn len(&self) -> usize {
        self.mu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mu.is_empty()
    }

    /// ∫_{-1}^{1} f(mu) dmu for even f, given f at the nodes.
    pub fn integrate(&self, values: impl Iterator<Item = f64>) -> f64 {
        self.weight.iter().zip(values).map(|(w, f)| w * f).sum()
    }
}

impl Default for EvenQuadrature {
    fn default() -> Self {
        Self::new(DEFAULT_NODES)
    }
}
