use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::solver::SolveLimits;

/// Weight of one unit of backlog in the objective, before the time discount
pub const BACKLOG_WEIGHT: f64 = 100.0;

fn default_backlog_weight() -> f64 {
    BACKLOG_WEIGHT
}

/// The fixed sets and scalars shared by the forecast and the model of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Number of locations, `N`
    locations: usize,
    /// Length of the planning horizon in days, `T`
    days: usize,
    /// Average length of stay; occupied capacity is freed after `epsilon` days
    epsilon: usize,
    /// Weight of backlog in the objective
    #[serde(default = "default_backlog_weight")]
    backlog_weight: f64,
    /// Time limit handed to the solver, in seconds
    #[serde(default)]
    time_limit: Option<f64>,
}

impl PlanningConfig {
    pub fn new(locations: usize, days: usize, epsilon: usize) -> Result<PlanningConfig> {
        let config = PlanningConfig {
            locations,
            days,
            epsilon,
            backlog_weight: BACKLOG_WEIGHT,
            time_limit: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_backlog_weight(mut self, weight: f64) -> Result<PlanningConfig> {
        self.backlog_weight = weight;
        self.validate()?;
        Ok(self)
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Result<PlanningConfig> {
        self.time_limit = Some(limit.as_secs_f64());
        self.validate()?;
        Ok(self)
    }

    /// Checks the invariants of a configuration, which matters for deserialized ones
    pub fn validate(&self) -> Result<()> {
        if self.locations == 0 {
            return Err(Error::InvalidParameter(
                "there must be at least one location".to_string(),
            ));
        }
        if self.days == 0 {
            return Err(Error::InvalidParameter(
                "the planning horizon must be at least one day".to_string(),
            ));
        }
        if self.epsilon == 0 {
            return Err(Error::InvalidParameter(
                "epsilon must be strictly positive".to_string(),
            ));
        }
        if !(self.backlog_weight.is_finite() && self.backlog_weight > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "backlog weight must be positive, got {}",
                self.backlog_weight
            )));
        }
        if let Some(limit) = self.time_limit {
            if !(limit > 0.0 && Duration::try_from_secs_f64(limit).is_ok()) {
                return Err(Error::InvalidParameter(format!(
                    "time limit must be a positive number of seconds within range, got {}",
                    limit
                )));
            }
        }
        Ok(())
    }

    /// The number of locations
    pub fn locations(&self) -> usize {
        self.locations
    }

    /// The number of days in the planning horizon
    pub fn days(&self) -> usize {
        self.days
    }

    pub fn epsilon(&self) -> usize {
        self.epsilon
    }

    pub fn backlog_weight(&self) -> f64 {
        self.backlog_weight
    }

    /// Whether the horizon is longer than the turnover window, i.e. capacity is recycled
    pub fn recycles_capacity(&self) -> bool {
        self.days > self.epsilon
    }

    pub fn solve_limits(&self) -> Result<SolveLimits> {
        let time_limit = self
            .time_limit
            .map(|limit| {
                Duration::try_from_secs_f64(limit).map_err(|err| {
                    Error::InvalidParameter(format!("time limit of {} s: {}", limit, err))
                })
            })
            .transpose()?;
        Ok(SolveLimits { time_limit })
    }
}
