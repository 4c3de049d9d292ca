pub mod forecast;
pub mod reading;

pub use forecast::{Forecast, ForecastPoint};
pub use reading::{AqiBand, Reading};
