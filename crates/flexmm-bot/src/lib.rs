//! flexmm bot application: configuration, logging, worker assembly,
//! and a paper venue for dry runs.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod paper;

pub use app::Application;
pub use config::{AppConfig, WorkerConfig};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
pub use paper::{PaperAccount, PaperSource, PaperVenue};
