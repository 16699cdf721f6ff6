//! Moscow public transport stop forecasts
//!
//! Client for the `stop_v2` endpoint of the moscowapp API
//! (`https://api.moscowapp.mos.ru/v8.2/`). A lookup returns the stop, the
//! routes serving it and live arrival forecasts for each route.
//!
//! # Architecture
//!
//! [`StopDataClient`] is the capability callers depend on: fetch a stop by
//! identifier, failing with a network, status or decode error. [`MgtApiClient`]
//! implements it over HTTP. Error response bodies go to an injected
//! [`ResponseDiagnostics`] sink, [`NoopDiagnostics`] unless configured
//! otherwise.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_mgt::{MgtApiClient, MgtConfig, StopDataClient};
//!
//! let client = MgtApiClient::new(&MgtConfig::default())?;
//! let stop = client.get_stop_data("9d7f733a-d532-4fca-a922-4c978b79681c").await?;
//! println!("{}", stop.name);
//! ```

mod arrivals;
mod client;
mod config;
mod diagnostics;
mod error;
mod models;

pub use arrivals::{Arrival, fetch_arrivals, format_arrivals, upcoming_arrivals};
pub use client::{MgtApiClient, StopDataClient};
pub use config::{DEFAULT_BASE_URL, MgtConfig, StopIdEncoding};
pub use diagnostics::{NoopDiagnostics, ResponseDiagnostics, TracingDiagnostics};
pub use error::MgtError;
pub use models::{Forecast, RoutePath, StopData, TransportType};
