//! # bench-data: Experiment Data for Optimization Benchmarks
//!
//! bench-data stores the results of benchmarking optimization algorithms:
//! which algorithm setups (experiments) were run on which problem instances,
//! and the progress each run recorded over time.
//!
//! ## Design Principles
//!
//! - **Immutable once built**: every set is validated and sorted at
//!   construction; nothing can be added, removed or reordered afterwards
//! - **Builders gate construction**: values are assembled in lock-guarded
//!   [`context`]s that enforce `open -> close -> compile`
//! - **Compact points**: a data point stores one `i64` per dimension
//!   ([`storage::LongEncodedDataPoint`]) whatever the column types are
//! - **Logarithmic lookup**: [`run::Run::find`] answers "what was the state
//!   at time t" or "when was quality q reached" by binary search
//!
//! ## Example Usage
//!
//! ```rust
//! use bench_data::context::DimensionBuilder;
//! use bench_data::dimension::{DimensionDirection, DimensionSet, DimensionType};
//! use bench_data::storage::{DataFactory, DataPoint, PrimitiveType};
//!
//! let fes = DimensionBuilder::context();
//! fes.open()?;
//! fes.set_name("FEs")?;
//! fes.set_primitive_type(PrimitiveType::Long)?;
//! fes.set_dimension_type(DimensionType::IterationFe)?;
//! fes.set_direction(DimensionDirection::IncreasingStrictly)?;
//! let dimensions = DimensionSet::new(vec![fes.finish()?])?;
//!
//! let run = dimensions.factory().create_run(vec![
//!     dimensions.factory().parse_string("1")?,
//!     dimensions.factory().parse_string("100")?,
//! ])?;
//! assert_eq!(run.find_long(0, 50).map(|p| p.get_long(0)), Some(1));
//! # Ok::<(), bench_data::Error>(())
//! ```
//!
//! See [`experiment`] for building a complete experiment set.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod backend;
pub mod config;
pub mod context;
pub mod dataset;
pub mod dimension;
pub mod error;
pub mod experiment;
pub mod id;
pub mod instance;
pub mod parser;
pub mod property;
pub mod run;
pub mod storage;

pub use config::{SpecializationMode, StoreConfig};
pub use error::{Error, Result};
pub use experiment::{Experiment, ExperimentSet, InstanceRuns};
pub use id::{IdObject, NamedIdObject};
pub use run::Run;
