//! Pure statistics over a batch of game results.

use crate::game::GameResult;

/// Fraction of `true` outcomes; `0.0` for an empty batch.
pub fn success_rate(outcomes: &[bool]) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    outcomes.iter().filter(|&&s| s).count() as f64 / outcomes.len() as f64
}

/// Mean question count over successful games only.
///
/// `None` when no game succeeded (or no successful game has a count).
pub fn mean_questions(results: &[GameResult]) -> Option<f64> {
    let counts: Vec<u32> = results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| r.number_of_questions)
        .collect();
    if counts.is_empty() {
        return None;
    }
    Some(counts.iter().map(|&c| f64::from(c)).sum::<f64>() / counts.len() as f64)
}

/// Equal-tailed binomial quantile interval, as a fraction of `n`.
///
/// For `X ~ Binomial(n, p)`, the bounds are the `(1 - confidence) / 2` and
/// `(1 + confidence) / 2` quantiles of `X` (smallest `k` whose CDF reaches
/// the level), each divided by `n`. Returns `(p, p)` at the degenerate ends
/// `p = 0` and `p = 1`, and `(0, 0)` for `n = 0`.
pub fn binomial_interval(n: u64, p: f64, confidence: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }
    if p <= 0.0 {
        return (0.0, 0.0);
    }
    if p >= 1.0 {
        return (1.0, 1.0);
    }
    let lower = binomial_quantile(n, p, (1.0 - confidence) / 2.0);
    let upper = binomial_quantile(n, p, (1.0 + confidence) / 2.0);
    (lower as f64 / n as f64, upper as f64 / n as f64)
}

/// Smallest `k` in `0..=n` with `P(X <= k) >= q`, for `0 < p < 1`.
fn binomial_quantile(n: u64, p: f64, q: f64) -> u64 {
    // Log-space recurrence keeps large `n` from underflowing at k = 0.
    let ln_p = p.ln();
    let ln_q = (1.0 - p).ln();
    let mut ln_pmf = n as f64 * ln_q;
    let mut cdf = 0.0;
    for k in 0..=n {
        if k > 0 {
            ln_pmf += ((n - k + 1) as f64).ln() - (k as f64).ln() + ln_p - ln_q;
        }
        cdf += ln_pmf.exp();
        if cdf + 1e-12 >= q {
            return k;
        }
    }
    n
}

/// Aggregate statistics for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub trials: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub mean_number_of_questions: Option<f64>,
}

impl Summary {
    pub fn from_results(results: &[GameResult], confidence: f64) -> Self {
        let outcomes: Vec<bool> = results.iter().map(|r| r.success).collect();
        let rate = success_rate(&outcomes);
        let (ci_lower, ci_upper) = binomial_interval(outcomes.len() as u64, rate, confidence);
        Self {
            trials: outcomes.len(),
            successes: outcomes.iter().filter(|&&s| s).count(),
            success_rate: rate,
            ci_lower,
            ci_upper,
            mean_number_of_questions: mean_questions(results),
        }
    }
}
