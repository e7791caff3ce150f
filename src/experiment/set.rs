//! Experiment set - the root aggregate

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::dataset::{Arrangement, DataSet};
use crate::dimension::DimensionSet;
use crate::id::{names_equivalent, IdObject, NamedIdObject, SetHandle, SetKind};
use crate::instance::{Instance, InstanceSet};
use crate::property::{FeatureSet, ParameterSet};
use crate::{Error, Result};

use super::{Experiment, InstanceRuns};

/// Dimensions, instances, features, parameters and experiments of one study.
#[derive(Debug, Clone)]
pub struct ExperimentSet {
    dimensions: Arc<DimensionSet>,
    instances: InstanceSet,
    features: FeatureSet,
    parameters: ParameterSet,
    experiments: DataSet<Experiment>,
}

impl ExperimentSet {
    /// Assemble and cross-check an experiment set.
    ///
    /// # Errors
    ///
    /// * [`Error::EmptySet`] if there are no experiments
    /// * [`Error::DuplicateElement`] for experiment names differing only in case
    /// * [`Error::InvalidArgument`] if a setting, instance group or run belongs
    ///   to other sets than the ones given
    /// * [`Error::DuplicateParameterSetting`] if one experiment's parameter
    ///   setting equals or subsumes another's
    pub fn new(
        dimensions: Arc<DimensionSet>,
        instances: InstanceSet,
        features: FeatureSet,
        parameters: ParameterSet,
        experiments: Vec<Experiment>,
    ) -> Result<Self> {
        if let Some(instance) = instances
            .iter()
            .find(|i| i.features().set_id() != features.id())
        {
            return Err(Error::InvalidArgument(format!(
                "features of instance '{}' belong to another feature set",
                instance.name()
            )));
        }

        for experiment in &experiments {
            if experiment.parameters().set_id() != parameters.id() {
                return Err(Error::InvalidArgument(format!(
                    "parameters of experiment '{}' belong to another parameter set",
                    experiment.name()
                )));
            }
            for group in experiment.instance_runs() {
                check_group(&dimensions, &instances, experiment, group)?;
            }
        }

        for (i, first) in experiments.iter().enumerate() {
            for second in &experiments[i + 1..] {
                if first.parameters().subsumes(second.parameters())
                    || second.parameters().subsumes(first.parameters())
                {
                    return Err(Error::DuplicateParameterSetting {
                        first: first.name().to_string(),
                        second: second.name().to_string(),
                    });
                }
            }
        }

        let experiments = DataSet::new(
            SetHandle::root(SetKind::Experiments),
            experiments,
            Arrangement::Sorted,
        )?;
        let set = Self {
            dimensions,
            instances,
            features,
            parameters,
            experiments,
        };
        info!(
            id = set.id(),
            dimensions = set.dimensions.len(),
            instances = set.instances.len(),
            experiments = set.experiments.len(),
            runs = set.experiments.iter().map(Experiment::run_count).sum::<usize>(),
            storage = set.dimensions.factory().name(),
            "compiled experiment set"
        );
        Ok(set)
    }

    /// The dimensions.
    #[must_use]
    pub fn dimensions(&self) -> &Arc<DimensionSet> {
        &self.dimensions
    }

    /// The instances.
    #[must_use]
    pub const fn instances(&self) -> &InstanceSet {
        &self.instances
    }

    /// The instance features.
    #[must_use]
    pub const fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// The experiment parameters.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// The experiments, sorted by name.
    #[must_use]
    pub fn experiments(&self) -> &DataSet<Experiment> {
        &self.experiments
    }

    /// Experiment with the given name, compared case-insensitively.
    #[must_use]
    pub fn find_experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments
            .iter()
            .find(|e| names_equivalent(e.name(), name))
    }

    /// The instance a group of runs was performed on.
    ///
    /// # Panics
    ///
    /// Panics if `runs` does not come from this set.
    #[must_use]
    pub fn instance_of(&self, runs: &InstanceRuns) -> &Instance {
        &self.instances[runs.instance_index()]
    }
}

fn check_group(
    dimensions: &DimensionSet,
    instances: &InstanceSet,
    experiment: &Experiment,
    group: &InstanceRuns,
) -> Result<()> {
    let known = instances
        .get(group.instance_index())
        .is_some_and(|i| i.name() == group.instance_name());
    if !known {
        return Err(Error::InvalidArgument(format!(
            "experiment '{}' has runs on unknown instance '{}'",
            experiment.name(),
            group.instance_name()
        )));
    }
    if let Some(run) = group
        .runs()
        .iter()
        .find(|run| run.layout().as_ref() != dimensions.layout().as_ref())
    {
        return Err(Error::InvalidArgument(format!(
            "run {run} of experiment '{}' does not use the set's dimensions",
            experiment.name()
        )));
    }
    Ok(())
}

impl IdObject for ExperimentSet {
    fn id(&self) -> u64 {
        self.experiments.id()
    }

    fn path(&self) -> &str {
        self.experiments.path()
    }
}

impl fmt::Display for ExperimentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path(), self.id())
    }
}
