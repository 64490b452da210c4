use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::PlanningConfig;
use crate::forecast::{ForecastEngine, GrowthParameters};
use crate::scenario::Scenario;

fn pyerr<E: std::fmt::Display>(err: E) -> PyErr {
    PyErr::new::<PyValueError, _>(err.to_string())
}

fn engine(locations: usize, days: usize, epsilon: usize) -> PyResult<ForecastEngine> {
    let config = PlanningConfig::new(locations, days, epsilon).map_err(pyerr)?;
    Ok(ForecastEngine::new(&config))
}

fn rows(array: ndarray::Array2<f64>) -> Vec<Vec<f64>> {
    array.outer_iter().map(|row| row.to_vec()).collect()
}

/// Expected new ICU patients per location and day, `beta`
#[pyfunction]
pub fn demand_forecast(
    growth_parameters: Vec<Vec<f64>>,
    elapsed_days: i64,
    days: usize,
) -> PyResult<Vec<Vec<f64>>> {
    let locations = growth_parameters.len();
    let params = GrowthParameters::from_table(&growth_parameters, locations).map_err(pyerr)?;
    // epsilon does not affect beta
    let beta = engine(locations, days, days)?
        .demand_forecast(&params, elapsed_days)
        .map_err(pyerr)?;
    Ok(rows(beta))
}

/// Expected new ICU patients before the turnover cutoff, `alpha`
#[pyfunction]
pub fn turnover_forecast(
    growth_parameters: Vec<Vec<f64>>,
    elapsed_days: i64,
    days: usize,
    epsilon: usize,
) -> PyResult<Vec<Vec<f64>>> {
    let locations = growth_parameters.len();
    let params = GrowthParameters::from_table(&growth_parameters, locations).map_err(pyerr)?;
    let alpha = engine(locations, days, epsilon)?
        .turnover_forecast(&params, elapsed_days)
        .map_err(pyerr)?;
    Ok(rows(alpha))
}

/// Builds the model described by a JSON scenario and returns it in LP format
#[pyfunction]
pub fn scenario_lp(json: &str) -> PyResult<String> {
    let scenario = Scenario::from_json(json).map_err(pyerr)?;
    let system = scenario.build().map_err(pyerr)?;
    Ok(system.to_lp_string())
}

/// Entry point of `import icu_surge`; routes `log` records to Python's `logging`.
#[pymodule]
fn icu_surge(_py: Python, m: &PyModule) -> PyResult<()> {
    pyo3_log::init();
    m.add_function(wrap_pyfunction!(demand_forecast, m)?)?;
    m.add_function(wrap_pyfunction!(turnover_forecast, m)?)?;
    m.add_function(wrap_pyfunction!(scenario_lp, m)?)?;
    Ok(())
}
