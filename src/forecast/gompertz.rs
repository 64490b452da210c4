/// Cumulative number of diagnosed cases at day `d` according to the Gompertz curve
/// `G(d) = a * exp(-b * exp(-r * d))`
pub fn cumulative(a: f64, b: f64, r: f64, d: f64) -> f64 {
    a * (-b * (-r * d).exp()).exp()
}

/// Number of new cases diagnosed on day `d`, i.e. `G(d) - G(d - 1)`
pub fn new_cases(a: f64, b: f64, r: f64, d: f64) -> f64 {
    cumulative(a, b, r, d) - cumulative(a, b, r, d - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cumulative_approaches_the_asymptote() {
        assert_relative_eq!(cumulative(1000.0, 5.0, 0.1, 500.0), 1000.0);
        assert_relative_eq!(cumulative(1000.0, 5.0, 0.1, 0.0), 1000.0 * (-5.0f64).exp());
    }

    #[test]
    fn new_cases_is_the_marginal_increase() {
        let (a, b, r) = (5000.0, 8.0, 0.07);
        for d in 0..60 {
            let d = d as f64;
            assert_relative_eq!(
                new_cases(a, b, r, d),
                cumulative(a, b, r, d) - cumulative(a, b, r, d - 1.0)
            );
        }
    }

    #[test]
    fn new_cases_never_negative_for_positive_parameters() {
        for (a, b, r) in [(10.0, 1.0, 0.5), (1e6, 12.0, 0.03), (250.0, 0.2, 2.0)] {
            for d in -20..400 {
                assert!(new_cases(a, b, r, d as f64) >= 0.0, "d = {}", d);
            }
        }
    }
}
