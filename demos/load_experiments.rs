//! Experiment Loading Example
//!
//! Builds a small study of two TSP solvers through the context chain and
//! answers the two questions runs are stored for: what was the best tour
//! after a given number of evaluations, and when was a tour length reached.
//!
//! Run with: cargo run --example load_experiments
//! More detail: RUST_LOG=bench_data=debug cargo run --example load_experiments

use anyhow::Context as _;
use std::sync::Arc;

use bench_data::context::{ExperimentSetBuilder, ExperimentSetContext};
use bench_data::dimension::{DimensionDirection, DimensionType};
use bench_data::property::Value;
use bench_data::storage::{DataPoint, PrimitiveType};
use bench_data::{ExperimentSet, IdObject, NamedIdObject, StoreConfig};

/// Progress logs: solver, instance, rows of "FEs tour-length"
const LOGS: &[(&str, &str, &[&str])] = &[
    ("hc", "eil51", &["1 1402", "35 901", "410 612", "5102 447"]),
    ("hc", "eil51", &["1 1377", "80 840", "2630 468"]),
    ("hc", "berlin52", &["1 24105", "120 13011", "4471 8012"]),
    ("sa", "eil51", &["1 1455", "900 700", "12000 431", "40000 426"]),
    ("sa", "berlin52", &["1 23870", "1500 11050", "30000 7542"]),
];

fn define_dimensions(root: &ExperimentSetContext) -> anyhow::Result<()> {
    let fes = root.dimension_context()?;
    fes.open()?;
    fes.set_name("FEs")?;
    fes.add_description("Consumed objective function evaluations")?;
    fes.set_primitive_type(PrimitiveType::Long)?;
    fes.set_dimension_type(DimensionType::IterationFe)?;
    fes.set_direction(DimensionDirection::IncreasingStrictly)?;
    fes.set_lower_bound(1_i64)?;
    root.add_dimension(fes.finish()?)?;

    let length = root.dimension_context()?;
    length.open()?;
    length.set_name("tour length")?;
    length.add_description("Length of the best tour found so far")?;
    length.set_primitive_type(PrimitiveType::Int)?;
    length.set_dimension_type(DimensionType::QualityProblemDependent)?;
    length.set_direction(DimensionDirection::Decreasing)?;
    length.set_lower_bound(0_i32)?;
    root.add_dimension(length.finish()?)?;
    Ok(())
}

fn define_instances(root: &ExperimentSetContext) -> anyhow::Result<()> {
    for (name, cities, optimum) in [("eil51", 51_i64, 426_i32), ("berlin52", 52, 7542)] {
        let instance = root.instance_context()?;
        instance.open()?;
        instance.set_name(name)?;
        instance.set_feature("n", cities)?;
        instance.set_lower_bound("tour length", optimum)?;
        root.add_instance(instance.finish()?)?;
    }
    root.describe_feature("n", "Number of cities")?;
    Ok(())
}

fn define_experiments(root: &ExperimentSetContext) -> anyhow::Result<()> {
    for (solver, label) in [("hc", "hill climber"), ("sa", "simulated annealing")] {
        let experiment = root.experiment_context()?;
        experiment.open()?;
        experiment.set_name(label)?;
        experiment.set_parameter("algorithm", Value::from(solver))?;
        for (_, instance, rows) in LOGS.iter().filter(|(s, _, _)| *s == solver) {
            let run = experiment.run_context()?;
            run.open()?;
            for row in *rows {
                run.add_point_text(row)?;
            }
            experiment.add_run(instance, run.finish()?)?;
        }
        root.add_experiment(experiment.finish()?)?;
    }
    root.describe_parameter("algorithm", "Search strategy")?;
    Ok(())
}

fn load(config: StoreConfig) -> anyhow::Result<Arc<ExperimentSet>> {
    let root = ExperimentSetBuilder::context();
    root.open()?;
    root.set_config(config)?;
    define_dimensions(&root)?;
    define_instances(&root)?;
    define_experiments(&root)?;
    root.finish().context("compiling the study")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("=== bench-data Experiment Loading ===\n");

    let config = StoreConfig::from_json(r#"{"specialization": "auto"}"#)?;
    let set = load(config)?;

    println!("Study {set}");
    println!("  Storage: {}", set.dimensions().factory().name());
    for dimension in set.dimensions().iter() {
        println!(
            "  Dimension {}: {} ({})",
            dimension.name(),
            dimension.primitive_type(),
            dimension.direction()
        );
    }
    println!();

    for experiment in set.experiments().iter() {
        println!("Experiment '{}' {}", experiment.name(), experiment.parameters());
        for group in experiment.instance_runs().iter() {
            let instance = set.instance_of(group);
            let optimum = instance.lower_bound(1);
            for run in group.runs().iter() {
                let after_1000 = run
                    .find_long(0, 1_000)
                    .map_or_else(|| "-".to_string(), |p| p.get_long(1).to_string());
                let target = optimum.as_long() + optimum.as_long() / 20;
                let reached = run
                    .find_long(1, target)
                    .map_or_else(|| "never".to_string(), |p| p.get_long(0).to_string());
                println!(
                    "  {:<10} {:<8} best after 1000 FEs: {:>6}   within 5% of optimum after: {:>6} FEs",
                    instance.name(),
                    run.path().rsplit('/').next().unwrap_or_default(),
                    after_1000,
                    reached
                );
            }
        }
    }

    Ok(())
}
