//! Experiment data hierarchy
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentSet (1) ──< Experiment (N) ──< InstanceRuns (N) ──< Run (N)
//!       │                    │                   │
//!       │                    └─ ParameterSetting └─ Instance (ref by index)
//!       ├─ DimensionSet, InstanceSet
//!       └─ FeatureSet, ParameterSet
//! ```
//!
//! Every level is an immutable [`DataSet`](crate::dataset::DataSet). Children
//! refer to their owners by id, index and path only.
//!
//! ## Usage
//!
//! ```rust
//! use bench_data::context::ExperimentSetBuilder;
//! use bench_data::dimension::{DimensionDirection, DimensionType};
//! use bench_data::property::Value;
//! use bench_data::storage::{DataPoint, PrimitiveType};
//!
//! let root = ExperimentSetBuilder::context();
//! root.open()?;
//!
//! let fes = root.dimension_context()?;
//! fes.open()?;
//! fes.set_name("FEs")?;
//! fes.set_primitive_type(PrimitiveType::Long)?;
//! fes.set_dimension_type(DimensionType::IterationFe)?;
//! fes.set_direction(DimensionDirection::IncreasingStrictly)?;
//! root.add_dimension(fes.finish()?)?;
//!
//! let f = root.dimension_context()?;
//! f.open()?;
//! f.set_name("f")?;
//! f.set_primitive_type(PrimitiveType::Double)?;
//! f.set_dimension_type(DimensionType::QualityProblemDependent)?;
//! f.set_direction(DimensionDirection::Decreasing)?;
//! root.add_dimension(f.finish()?)?;
//!
//! let tsp = root.instance_context()?;
//! tsp.open()?;
//! tsp.set_name("tsp-100")?;
//! tsp.set_feature("n", Value::from(100_i64))?;
//! root.add_instance(tsp.finish()?)?;
//!
//! let hc = root.experiment_context()?;
//! hc.open()?;
//! hc.set_name("hill climber")?;
//! hc.set_parameter("algorithm", Value::from("hc"))?;
//! let run = hc.run_context()?;
//! run.open()?;
//! run.add_point_text("1 100.5")?;
//! run.add_point_text("50 80")?;
//! hc.add_run("tsp-100", run.finish()?)?;
//! root.add_experiment(hc.finish()?)?;
//!
//! let set = root.finish()?;
//! let experiment = set.find_experiment("Hill Climber").unwrap();
//! let runs = experiment.instance_runs();
//! let best = runs[0].runs()[0].find_long(0, 60).unwrap();
//! assert_eq!(best.get_double(1), 80.0);
//! # Ok::<(), bench_data::Error>(())
//! ```

mod instance_runs;
mod record;
mod set;

pub use instance_runs::InstanceRuns;
pub use record::Experiment;
pub use set::ExperimentSet;
