//! Gaussian Arithmetic
//!
//! Standard normal density, distribution and quantile functions, the logistic link,
//! and the truncated-Gaussian correction terms used by the pairwise update.
//!
//! Mathematical formulas:
//! - φ(x) = exp(-x²/2) / √(2π)
//! - Φ(x) = erfc(-x/√2) / 2
//! - v_win(t) = φ(t) / Φ(t),  w_win(t) = v(t)·(v(t) + t)
//! - v_draw(t, ε) = (φ(-ε-t) - φ(ε-t)) / (Φ(ε-t) - Φ(-ε-t))
//!
//! The complementary error function is evaluated through the incomplete gamma
//! function, to full double precision. The continued fraction keeps relative accuracy
//! in the tails where `1 - erf(x)` would cancel catastrophically.

use std::f64::consts::SQRT_2;

// ==================== Constants ====================

/// √(2π)
const SQRT_2PI: f64 = 2.506_628_274_631_000_7;

/// Below this denominator the truncated-Gaussian terms switch to their asymptotic limits
const TAIL_EPSILON: f64 = 2.222_758_749e-162;

/// 1/√π
const FRAC_1_SQRT_PI: f64 = 0.564_189_583_547_756_3;

/// Iteration cap for the erfc series and continued fraction
const MAX_SERIES_TERMS: usize = 200;

/// Scale that maps a probit argument onto the logistic curve: Φ(x) ≈ σ(1.702·x)
pub const PROBIT_TO_LOGIT: f64 = 1.702;

/// Logistic argument clamp, keeps σ strictly inside (0, 1) in double precision
const MAX_LOGIT: f64 = 30.0;

// ==================== Distribution Functions ====================

/// Complementary error function
///
/// erfc(x) = Q(1/2, x²), the regularized upper incomplete gamma function: a power
/// series below x² = 1.5 and a Lentz continued fraction above it.
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let z = x.abs();
    let tail = if z.is_infinite() {
        0.0
    } else if z * z < 1.5 {
        1.0 - erf_series(z)
    } else {
        erfc_continued_fraction(z)
    };
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// P(1/2, z²) by its power series, z² < 1.5
fn erf_series(z: f64) -> f64 {
    let x2 = z * z;
    let mut ap = 0.5;
    let mut term = 2.0;
    let mut sum = term;
    for _ in 0..MAX_SERIES_TERMS {
        ap += 1.0;
        term *= x2 / ap;
        sum += term;
        if term.abs() < sum.abs() * f64::EPSILON {
            break;
        }
    }
    sum * (-x2).exp() * z * FRAC_1_SQRT_PI
}

/// Q(1/2, z²) by the modified Lentz continued fraction, z² >= 1.5
fn erfc_continued_fraction(z: f64) -> f64 {
    const FP_MIN: f64 = f64::MIN_POSITIVE / f64::EPSILON;
    let x2 = z * z;
    let mut b = x2 + 0.5;
    let mut c = 1.0 / FP_MIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_SERIES_TERMS {
        let an = -(i as f64) * (i as f64 - 0.5);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FP_MIN {
            d = FP_MIN;
        }
        c = b + an / c;
        if c.abs() < FP_MIN {
            c = FP_MIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < f64::EPSILON {
            break;
        }
    }
    (-x2).exp() * z * FRAC_1_SQRT_PI * h
}

/// Standard normal probability density
pub fn pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

/// Standard normal cumulative distribution
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile function (inverse CDF)
///
/// Acklam's rational approximation, relative error < 1.15e-9 on (0, 1).
/// Returns ±∞ at the closed endpoints and NaN outside [0, 1].
pub fn ppf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

// ==================== Logistic Link ====================

/// Logistic function σ(x) = 1 / (1 + e^(-x))
///
/// The argument is clamped so the result never saturates to exactly 0 or 1.
pub fn logistic(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    let z = x.clamp(-MAX_LOGIT, MAX_LOGIT);
    1.0 / (1.0 + (-z).exp())
}

/// Log-odds of a probability, clamped to the same range as [`logistic`]
pub fn logit(p: f64) -> f64 {
    let eps = logistic(-MAX_LOGIT);
    let p = p.clamp(eps, 1.0 - eps);
    (p / (1.0 - p)).ln().clamp(-MAX_LOGIT, MAX_LOGIT)
}

// ==================== Truncated Gaussian Terms ====================

/// Mean-shift factor for a one-sided truncation at `t` (win)
pub fn v_win(t: f64) -> f64 {
    let denom = cdf(t);
    if denom < TAIL_EPSILON {
        // φ(t)/Φ(t) → -t as t → -∞
        return -t;
    }
    pdf(t) / denom
}

/// Variance-reduction factor for a one-sided truncation at `t` (win)
///
/// Lies in (0, 1) for every finite `t`.
pub fn w_win(t: f64) -> f64 {
    let denom = cdf(t);
    if denom < TAIL_EPSILON {
        return if t < 0.0 { 1.0 } else { 0.0 };
    }
    let v = v_win(t);
    (v * (v + t)).clamp(0.0, 1.0)
}

/// Mean-shift factor for a two-sided truncation to `[-ε, ε]` around `t` (draw)
pub fn v_draw(t: f64, margin: f64) -> f64 {
    let abs_t = t.abs();
    let denom = cdf(margin - abs_t) - cdf(-margin - abs_t);
    if denom < TAIL_EPSILON {
        let a = margin - abs_t;
        return if t < 0.0 { -a } else { a };
    }
    let numer = pdf(-margin - abs_t) - pdf(margin - abs_t);
    let v = numer / denom;
    if t < 0.0 {
        -v
    } else {
        v
    }
}

/// Variance-reduction factor for a two-sided truncation to `[-ε, ε]` around `t` (draw)
pub fn w_draw(t: f64, margin: f64) -> f64 {
    let abs_t = t.abs();
    let denom = cdf(margin - abs_t) - cdf(-margin - abs_t);
    if denom < TAIL_EPSILON {
        return 1.0;
    }
    let v = v_draw(abs_t, margin);
    let w = v * v
        + ((margin - abs_t) * pdf(margin - abs_t) - (-margin - abs_t) * pdf(-margin - abs_t))
            / denom;
    w.clamp(0.0, 1.0)
}

/// Draw margin ε for a given draw probability between two performances with noise `beta`
///
/// ε = Φ⁻¹((p + 1) / 2) · √2 · β
pub fn draw_margin(draw_probability: f64, beta: f64) -> f64 {
    ppf((draw_probability + 1.0) / 2.0) * SQRT_2 * beta
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_cdf_known_values() {
        assert!((cdf(0.0) - 0.5).abs() < TOL);
        assert!((cdf(1.96) - 0.975_002_1).abs() < TOL);
        assert!((cdf(-1.96) - 0.024_997_9).abs() < TOL);
        assert!((cdf(1.0) - 0.841_344_7).abs() < TOL);
    }

    #[test]
    fn test_erfc_double_precision() {
        let cases = [
            (0.0, 1.0),
            (0.5, 0.479_500_122_186_953_5),
            (1.0, 0.157_299_207_050_285_13),
            (2.0, 0.004_677_734_981_047_266),
            (3.0, 2.209_049_699_858_544e-5),
        ];
        for (x, expected) in cases {
            let got = erfc(x);
            assert!(
                ((got - expected) / expected).abs() < 1e-12,
                "erfc({}) = {}, expected {}",
                x,
                got,
                expected
            );
            assert!((erfc(-x) - (2.0 - expected)).abs() < 1e-15);
        }
        assert_eq!(cdf(0.0), 0.5);
        assert_eq!(erfc(f64::INFINITY), 0.0);
        assert_eq!(erfc(f64::NEG_INFINITY), 2.0);
    }

    #[test]
    fn test_cdf_tail_relative_accuracy() {
        // Φ(-10) ≈ 7.6199e-24
        let tail = cdf(-10.0);
        assert!(tail > 0.0, "tail should not underflow");
        assert!((tail / 7.619_853_024_160_527e-24 - 1.0).abs() < 1e-10, "tail = {}", tail);
    }

    #[test]
    fn test_cdf_monotonic() {
        let mut prev = cdf(-8.0);
        let mut x = -8.0;
        while x < 8.0 {
            x += 0.25;
            let cur = cdf(x);
            assert!(cur >= prev, "cdf not monotonic at {}", x);
            prev = cur;
        }
    }

    #[test]
    fn test_pdf_peak_and_symmetry() {
        assert!((pdf(0.0) - 0.398_942_28).abs() < TOL);
        assert!((pdf(1.3) - pdf(-1.3)).abs() < 1e-15);
    }

    #[test]
    fn test_ppf_inverts_cdf() {
        for &p in &[0.001, 0.01, 0.1, 0.3, 0.5, 0.7, 0.9, 0.99, 0.999] {
            let x = ppf(p);
            assert!((cdf(x) - p).abs() < 1e-6, "ppf({}) = {} round-trips to {}", p, x, cdf(x));
        }
        assert_eq!(ppf(0.0), f64::NEG_INFINITY);
        assert_eq!(ppf(1.0), f64::INFINITY);
        assert!(ppf(1.5).is_nan());
    }

    #[test]
    fn test_logistic_bounds() {
        assert!((logistic(0.0) - 0.5).abs() < 1e-15);
        assert!(logistic(1e6) < 1.0);
        assert!(logistic(-1e6) > 0.0);
        assert_eq!(logistic(f64::NAN), 0.5);
        assert!(logistic(f64::INFINITY) < 1.0);
    }

    #[test]
    fn test_logit_inverts_logistic() {
        for &x in &[-5.0, -1.0, 0.0, 0.3, 2.5] {
            assert!((logit(logistic(x)) - x).abs() < 1e-9);
        }
        assert!(logit(0.0).is_finite());
        assert!(logit(1.0).is_finite());
    }

    #[test]
    fn test_v_win_positive_and_decreasing() {
        let mut prev = v_win(-6.0);
        let mut t = -6.0;
        while t < 6.0 {
            t += 0.5;
            let v = v_win(t);
            assert!(v > 0.0, "v_win({}) = {} should be positive", t, v);
            assert!(v <= prev, "v_win should decrease in t");
            prev = v;
        }
        assert!((v_win(0.0) - 0.797_884_56).abs() < TOL);
    }

    #[test]
    fn test_w_win_in_unit_interval() {
        for i in -40..=40 {
            let t = i as f64 * 0.5;
            let w = w_win(t);
            assert!((0.0..=1.0).contains(&w), "w_win({}) = {} out of range", t, w);
        }
        assert!((w_win(0.0) - 0.636_619_77).abs() < TOL);
    }

    #[test]
    fn test_win_terms_extreme_tail() {
        let v = v_win(-50.0);
        assert!(v.is_finite() && v > 0.0);
        assert_eq!(w_win(-50.0), 1.0);
    }

    #[test]
    fn test_draw_terms_symmetric() {
        let margin = 0.3;
        assert!(v_draw(0.0, margin).abs() < 1e-12);
        assert!((v_draw(0.7, margin) + v_draw(-0.7, margin)).abs() < 1e-12);
        let w = w_draw(0.2, margin);
        assert!((0.0..=1.0).contains(&w));
    }

    #[test]
    fn test_draw_margin_grows_with_probability() {
        let low = draw_margin(0.05, 0.5);
        let high = draw_margin(0.5, 0.5);
        assert!(low > 0.0);
        assert!(high > low);
    }

    #[test]
    fn test_probit_logistic_approximation() {
        for &x in &[-2.0, -0.5, 0.0, 0.5, 2.0] {
            assert!((logistic(PROBIT_TO_LOGIT * x) - cdf(x)).abs() < 0.01);
        }
    }
}
