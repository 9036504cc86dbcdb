//! Filtering and aggregation engine behind an HR analytics dashboard.
//!
//! Load the employee CSV once through a [`DatasetCache`], hand the shared
//! dataset to a [`DashboardSession`] per viewer, and read a
//! [`FilteredView`](data::filter::FilteredView) back after every selection
//! change.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod snapshot;
pub mod state;

pub use data::filter::{apply, FilterSelections, FilteredView, Selection, ALL};
pub use data::loader::{load_file, DatasetCache};
pub use data::model::{Dataset, EmployeeRecord, FilterField};
pub use data::region::{classify, Region};
pub use error::{ConfigError, DataLoadError};
pub use state::DashboardSession;
