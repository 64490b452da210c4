use std::path::Path;

use chrono::{Local, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::PlanningConfig;
use crate::error::{Error, Result};
use crate::forecast::{ForecastEngine, GrowthParameters};
use crate::model::{AssembledSystem, ModelBuilder, ModelInputs};

/// Everything needed to build one allocation model, as delivered by a loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub config: PlanningConfig,
    /// Free ICU beds per location on the first day
    pub sigma: Vec<f64>,
    /// Patients waiting for a bed per location on the first day
    pub theta: Vec<f64>,
    /// One row per location: `a, b, r, prob_hospital, <unused>, prob_icu`
    pub growth_parameters: Vec<Vec<f64>>,
    pub costs: Vec<Vec<f64>>,
    /// Days since the onset of the epidemic. Derived from `onset` when absent.
    #[serde(default)]
    pub elapsed_days: Option<i64>,
    #[serde(default)]
    pub onset: Option<NaiveDate>,
    /// The date the model is built for, today when absent
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Scenario> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Scenario> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let scenario: Scenario = serde_json::from_reader(reader)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// The number of days since the onset of the epidemic
    pub fn elapsed_days(&self) -> Result<i64> {
        match (self.elapsed_days, self.onset) {
            (Some(days), _) => Ok(days),
            (None, Some(onset)) => {
                let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());
                Ok(elapsed_days(onset, as_of))
            }
            (None, None) => Err(Error::InvalidParameter(
                "either elapsed_days or onset must be given".to_string(),
            )),
        }
    }

    /// Forecasts demand and builds the allocation model
    pub fn build(&self) -> Result<AssembledSystem> {
        let params = GrowthParameters::from_table(&self.growth_parameters, self.config.locations())?;
        let elapsed = self.elapsed_days()?;
        info!("Building scenario {} days after onset", elapsed);

        let forecast = ForecastEngine::new(&self.config).forecast(&params, elapsed)?;
        let inputs = ModelInputs::from_raw(&self.costs, &self.sigma, &self.theta, forecast)?;
        ModelBuilder::new(&self.config).build(&inputs)
    }
}

/// Whole days from `onset` to `as_of`, negative when `as_of` precedes the onset
pub fn elapsed_days(onset: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - onset).num_days()
}
