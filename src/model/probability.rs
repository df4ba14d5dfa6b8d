/// Probabilities are kept inside [EPSILON, 1 - EPSILON] before any logit
pub const EPSILON: f64 = 1e-4;

pub fn clip(p: f64) -> f64 {
    p.clamp(EPSILON, 1.0 - EPSILON)
}

/// Log-odds of `p`, clipped first so the result is always finite
pub fn logit(p: f64) -> f64 {
    let p = clip(p);
    (p / (1.0 - p)).ln()
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean of the Beta(alpha + wins, beta + n - wins) posterior
pub fn beta_posterior_mean(wins: f64, n: f64, alpha: f64, beta: f64) -> f64 {
    (alpha + wins) / (alpha + beta + n)
}
