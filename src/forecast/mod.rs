pub mod gompertz;

use derive_more::Constructor;
use itertools::iproduct;
use log::{info, trace};
use ndarray::Array2;

use crate::config::PlanningConfig;
use crate::error::{Error, Result};

/// Minimum number of scalars per location in a growth parameter table
pub const GROWTH_PARAMETERS_LEN: usize = 6;

/// The epidemiological parameters of a single location
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct GrowthParameters {
    /// Asymptote of the cumulative curve
    pub a: f64,
    /// Displacement along the time axis
    pub b: f64,
    /// Growth rate
    pub r: f64,
    /// Fraction of diagnosed cases that need hospitalization
    pub prob_hospital: f64,
    /// Fraction of hospitalized cases that need an ICU bed
    pub prob_icu: f64,
}

impl GrowthParameters {
    /// Reads one row per location. The positions are fixed:
    /// `a, b, r, prob_hospital, <unused>, prob_icu`.
    pub fn from_table(table: &[Vec<f64>], locations: usize) -> Result<Vec<GrowthParameters>> {
        if table.len() != locations {
            return Err(Error::InvalidParameterShape {
                location: None,
                expected: locations,
                actual: table.len(),
            });
        }

        table
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() < GROWTH_PARAMETERS_LEN {
                    return Err(Error::InvalidParameterShape {
                        location: Some(i),
                        expected: GROWTH_PARAMETERS_LEN,
                        actual: row.len(),
                    });
                }
                let params = GrowthParameters::new(row[0], row[1], row[2], row[3], row[5]);
                params.validate(i)?;
                Ok(params)
            })
            .collect()
    }

    fn validate(&self, location: usize) -> Result<()> {
        let curve = [("a", self.a), ("b", self.b), ("r", self.r)];
        for (name, value) in curve {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{} = {} for location {} must be finite and non-negative",
                    name, value, location
                )));
            }
        }

        let probs = [
            ("prob_hospital", self.prob_hospital),
            ("prob_icu", self.prob_icu),
        ];
        for (name, value) in probs {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidParameter(format!(
                    "{} = {} for location {} is not a probability",
                    name, value, location
                )));
            }
        }

        Ok(())
    }

    /// Expected number of new ICU patients on `day`, truncated toward zero
    pub fn icu_demand(&self, day: f64) -> f64 {
        let diagnosed = gompertz::new_cases(self.a, self.b, self.r, day);
        (diagnosed * self.prob_hospital * self.prob_icu).trunc()
    }
}

/// Both demand arrays required by the model
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// New arrivals feeding the backlog, `(N, T)`
    pub beta: Array2<f64>,
    /// New demand counted in the capacity balance, zero from `epsilon` on, `(N, T)`
    pub alpha: Array2<f64>,
}

pub struct ForecastEngine {
    config: PlanningConfig,
}

impl ForecastEngine {
    pub fn new(config: &PlanningConfig) -> ForecastEngine {
        ForecastEngine {
            config: config.clone(),
        }
    }

    fn check_locations(&self, params: &[GrowthParameters]) -> Result<()> {
        if params.len() != self.config.locations() {
            return Err(Error::InvalidParameterShape {
                location: None,
                expected: self.config.locations(),
                actual: params.len(),
            });
        }
        Ok(())
    }

    /// The calendar day `elapsed_days + t`, counted from the epidemic onset
    fn day(elapsed_days: i64, t: usize) -> Result<i64> {
        i64::try_from(t)
            .ok()
            .and_then(|t| elapsed_days.checked_add(t))
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "day {} after {} elapsed days is out of range",
                    t, elapsed_days
                ))
            })
    }

    /// The expected new backlog inflow `beta[i][t]` on day `elapsed_days + t`
    pub fn demand_forecast(
        &self,
        params: &[GrowthParameters],
        elapsed_days: i64,
    ) -> Result<Array2<f64>> {
        self.check_locations(params)?;
        let (n, t) = (self.config.locations(), self.config.days());

        let mut beta = Array2::zeros((n, t));
        for (i, t) in iproduct!(0..n, 0..t) {
            let day = Self::day(elapsed_days, t)?;
            beta[(i, t)] = params[i].icu_demand(day as f64);
            trace!("beta[{}][{}] = {} (day {})", i, t, beta[(i, t)], day);
        }

        info!(
            "Forecasted {} new ICU patients over {} days at {} locations",
            beta.sum(),
            t,
            n
        );
        Ok(beta)
    }

    /// Same as the demand forecast, but patients arriving from day `epsilon` on are left
    /// out, since their beds are accounted for by the recycling balance
    pub fn turnover_forecast(
        &self,
        params: &[GrowthParameters],
        elapsed_days: i64,
    ) -> Result<Array2<f64>> {
        self.check_locations(params)?;
        let (n, t) = (self.config.locations(), self.config.days());
        let epsilon = self.config.epsilon();

        let mut alpha = Array2::zeros((n, t));
        for (i, t) in iproduct!(0..n, 0..t.min(epsilon)) {
            let day = Self::day(elapsed_days, t)?;
            alpha[(i, t)] = params[i].icu_demand(day as f64);
            trace!("alpha[{}][{}] = {} (day {})", i, t, alpha[(i, t)], day);
        }

        Ok(alpha)
    }

    pub fn forecast(&self, params: &[GrowthParameters], elapsed_days: i64) -> Result<Forecast> {
        Ok(Forecast {
            beta: self.demand_forecast(params, elapsed_days)?,
            alpha: self.turnover_forecast(params, elapsed_days)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<GrowthParameters> {
        vec![
            GrowthParameters::new(50_000.0, 10.0, 0.08, 0.2, 0.3),
            GrowthParameters::new(20_000.0, 6.0, 0.05, 0.15, 0.25),
        ]
    }

    #[test]
    fn days_past_i64_range_are_rejected() {
        let config = PlanningConfig::new(2, 3, 2).unwrap();
        let engine = ForecastEngine::new(&config);
        assert!(matches!(
            engine.demand_forecast(&params(), i64::MAX),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.turnover_forecast(&params(), i64::MAX - 1),
            Err(Error::InvalidParameter(_))
        ));
        // the last day of the horizon is still representable
        assert!(engine.demand_forecast(&params(), i64::MAX - 2).is_ok());
    }

    #[test]
    fn reads_fixed_positions_and_skips_the_unused_column() {
        let table = vec![vec![1.0, 2.0, 3.0, 0.4, 99.0, 0.6, 7.0]];
        let params = GrowthParameters::from_table(&table, 1).unwrap();
        assert_eq!(params, vec![GrowthParameters::new(1.0, 2.0, 3.0, 0.4, 0.6)]);
    }

    #[test]
    fn short_rows_are_rejected() {
        let table = vec![vec![1.0, 2.0, 3.0, 0.4, 0.5, 0.6], vec![1.0, 2.0, 3.0]];
        assert_eq!(
            GrowthParameters::from_table(&table, 2),
            Err(Error::InvalidParameterShape {
                location: Some(1),
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn missing_locations_are_rejected() {
        let table = vec![vec![1.0, 2.0, 3.0, 0.4, 0.5, 0.6]];
        assert!(matches!(
            GrowthParameters::from_table(&table, 2),
            Err(Error::InvalidParameterShape { location: None, .. })
        ));
    }

    #[test]
    fn probabilities_must_be_in_range() {
        let table = vec![vec![1.0, 2.0, 3.0, 1.4, 0.5, 0.6]];
        assert!(matches!(
            GrowthParameters::from_table(&table, 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn beta_is_truncated_product() {
        let config = PlanningConfig::new(2, 10, 4).unwrap();
        let engine = ForecastEngine::new(&config);
        let params = params();
        let beta = engine.demand_forecast(&params, 30).unwrap();

        assert_eq!(beta.dim(), (2, 10));
        for ((i, t), value) in beta.indexed_iter() {
            let p = &params[i];
            let exact = gompertz::new_cases(p.a, p.b, p.r, (30 + t) as f64)
                * p.prob_hospital
                * p.prob_icu;
            assert!(*value >= 0.0);
            assert_eq!(*value, exact.floor());
            assert!(*value <= exact);
            assert!(exact - *value < 1.0);
        }
    }

    #[test]
    fn alpha_is_zero_from_epsilon_on() {
        let config = PlanningConfig::new(2, 10, 4).unwrap();
        let engine = ForecastEngine::new(&config);
        let forecast = engine.forecast(&params(), 30).unwrap();

        for ((i, t), value) in forecast.alpha.indexed_iter() {
            if t >= 4 {
                assert_eq!(*value, 0.0);
            } else {
                assert_eq!(*value, forecast.beta[(i, t)]);
            }
        }
    }

    #[test]
    fn alpha_equals_beta_when_horizon_fits_in_epsilon() {
        let config = PlanningConfig::new(2, 3, 5).unwrap();
        let forecast = ForecastEngine::new(&config).forecast(&params(), 12).unwrap();
        assert_eq!(forecast.alpha, forecast.beta);
    }

    #[test]
    fn location_count_must_match_config() {
        let config = PlanningConfig::new(3, 3, 2).unwrap();
        let engine = ForecastEngine::new(&config);
        assert!(engine.demand_forecast(&params(), 0).is_err());
        assert!(engine.turnover_forecast(&params(), 0).is_err());
    }
}
