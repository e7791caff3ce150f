//! Experiment-set builder - the root of the builder chain
//!
//! Dimensions are added first. Opening the first instance or experiment
//! context fixes them: the dimension set is built, its storage strategy is
//! selected, and no further dimension can be added. Feature and parameter
//! sets are gathered from the values the instances and experiments use.

use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::experiment::ExperimentBuilder;
use super::instance::InstanceBuilder;
use super::named::join_description;
use super::{
    Builder, Context, DimensionBuilder, DimensionContext, ExperimentContext, ExperimentDraft,
    InstanceContext, InstanceDraft,
};
use crate::backend::{Specializer, Unavailable};
use crate::config::StoreConfig;
use crate::dimension::{Dimension, DimensionSet};
use crate::experiment::{Experiment, ExperimentSet, InstanceRuns};
use crate::id::{names_equivalent, normalize_name};
use crate::instance::{Instance, InstanceSet};
use crate::property::{FeatureSet, ParameterSet, Property, PropertyKind, Scalar, Value};
use crate::run::Run;
use crate::{Error, Result};

bitflags! {
    /// Fields of an [`ExperimentSetBuilder`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExperimentSetField: u8 {
        /// Store configuration
        const CONFIG = 1;
        /// Storage specializer
        const SPECIALIZER = 1 << 1;
        /// Dimensions
        const DIMENSION = 1 << 2;
        /// Instances
        const INSTANCE = 1 << 3;
        /// Experiments
        const EXPERIMENT = 1 << 4;
        /// Feature descriptions
        const FEATURE_DESCRIPTION = 1 << 5;
        /// Parameter descriptions
        const PARAMETER_DESCRIPTION = 1 << 6;
    }
}

/// Accumulates dimensions, instances and experiments.
#[derive(Debug)]
pub struct ExperimentSetBuilder {
    config: StoreConfig,
    specializer: Arc<dyn Specializer>,
    dimensions: Vec<Dimension>,
    fixed: Option<Arc<DimensionSet>>,
    instances: Vec<InstanceDraft>,
    experiments: Vec<ExperimentDraft>,
    feature_descriptions: FxHashMap<String, String>,
    parameter_descriptions: FxHashMap<String, String>,
}

/// Context building an [`ExperimentSet`].
pub type ExperimentSetContext = Context<ExperimentSetBuilder>;

impl Default for ExperimentSetBuilder {
    fn default() -> Self {
        Self {
            config: StoreConfig::default(),
            specializer: Arc::new(Unavailable),
            dimensions: Vec::new(),
            fixed: None,
            instances: Vec::new(),
            experiments: Vec::new(),
            feature_descriptions: FxHashMap::default(),
            parameter_descriptions: FxHashMap::default(),
        }
    }
}

impl ExperimentSetBuilder {
    /// A fresh, unopened experiment-set context.
    #[must_use]
    pub fn context() -> ExperimentSetContext {
        Context::new(Self::default())
    }

    fn ensure_unfixed(&self, what: &str) -> Result<()> {
        if self.fixed.is_some() {
            return Err(Error::InvalidArgument(format!(
                "cannot set {what}: the dimensions are already fixed"
            )));
        }
        Ok(())
    }

    fn fix_dimensions(&mut self) -> Result<Arc<DimensionSet>> {
        if let Some(fixed) = &self.fixed {
            return Ok(Arc::clone(fixed));
        }
        let set = Arc::new(DimensionSet::with_backend(
            std::mem::take(&mut self.dimensions),
            &self.config,
            self.specializer.as_ref(),
        )?);
        self.fixed = Some(Arc::clone(&set));
        Ok(set)
    }

    fn build_instance(features: &FeatureSet, dims: usize, draft: InstanceDraft) -> Result<Instance> {
        if draft.lower.len() != dims || draft.upper.len() != dims {
            return Err(Error::InvalidArgument(format!(
                "instance '{}' has bounds for {} dimensions, expected {dims}",
                draft.name,
                draft.lower.len()
            )));
        }
        let setting = features.setting(&draft.features)?;
        Instance::new(
            &draft.name,
            draft.description,
            setting,
            draft.lower,
            draft.upper,
        )
    }

    fn build_experiment(
        instances: &InstanceSet,
        parameters: &ParameterSet,
        draft: ExperimentDraft,
    ) -> Result<Experiment> {
        let mut groups: FxHashMap<usize, Vec<Run>> = FxHashMap::default();
        for (name, run) in draft.runs {
            let instance = instances.find(&name).ok_or(Error::NotFound {
                kind: "instance",
                name,
            })?;
            groups.entry(instance.index()).or_default().push(run);
        }
        let runs = groups
            .into_iter()
            .map(|(index, runs)| InstanceRuns::new(&instances[index], runs))
            .collect::<Result<Vec<_>>>()?;
        let setting = parameters.setting(&draft.parameters)?;
        Experiment::new(&draft.name, draft.description, setting, runs)
    }
}

/// Collect the properties named in `assignments`, each with the distinct
/// concrete values it was given. The first spelling of a name wins.
fn gather<'a, K: PropertyKind>(
    assignments: impl Iterator<Item = &'a (String, Value)>,
    descriptions: &FxHashMap<String, String>,
) -> Result<Vec<Property<K>>> {
    let mut order: Vec<(String, Vec<Scalar>)> = Vec::new();
    let mut by_key: FxHashMap<String, usize> = FxHashMap::default();
    for (name, value) in assignments {
        let name = normalize_name(name)?;
        let slot = *by_key.entry(name.to_lowercase()).or_insert_with(|| {
            order.push((name.clone(), Vec::new()));
            order.len() - 1
        });
        let Some(scalar) = value.scalar() else {
            continue;
        };
        let values = &mut order[slot].1;
        let seen = values.iter().any(|known| {
            known == scalar
                || known.loosely_equals(scalar)
                || names_equivalent(&known.to_string(), &scalar.to_string())
        });
        if !seen {
            values.push(scalar.clone());
        }
    }

    order
        .into_iter()
        .map(|(name, values)| {
            let description = descriptions.get(&name.to_lowercase()).cloned();
            Property::new(&name, description, values)
        })
        .collect()
}

fn describe(
    descriptions: &mut FxHashMap<String, String>,
    property: &str,
    fragment: &str,
) -> Result<()> {
    let key = normalize_name(property)?.to_lowercase();
    let joined = join_description(descriptions.remove(&key), fragment);
    if let Some(text) = joined {
        descriptions.insert(key, text);
    }
    Ok(())
}

impl Builder for ExperimentSetBuilder {
    type Field = ExperimentSetField;
    type Output = Arc<ExperimentSet>;

    const KIND: &'static str = "experiment set";
    const REQUIRED: ExperimentSetField = ExperimentSetField::DIMENSION
        .union(ExperimentSetField::INSTANCE)
        .union(ExperimentSetField::EXPERIMENT);
    const ALLOWS_CHILDREN: bool = true;

    fn build(&mut self) -> Result<Arc<ExperimentSet>> {
        let dimensions = self.fix_dimensions()?;
        let instance_drafts = std::mem::take(&mut self.instances);
        let experiment_drafts = std::mem::take(&mut self.experiments);

        let features = FeatureSet::new(gather(
            instance_drafts.iter().flat_map(|d| d.features.iter()),
            &self.feature_descriptions,
        )?)?;
        let parameters = ParameterSet::new(gather(
            experiment_drafts.iter().flat_map(|d| d.parameters.iter()),
            &self.parameter_descriptions,
        )?)?;
        debug!(
            features = features.len(),
            parameters = parameters.len(),
            "gathered property sets"
        );

        let instances = InstanceSet::new(
            instance_drafts
                .into_iter()
                .map(|draft| Self::build_instance(&features, dimensions.len(), draft))
                .collect::<Result<Vec<_>>>()?,
        )?;
        let experiments = experiment_drafts
            .into_iter()
            .map(|draft| Self::build_experiment(&instances, &parameters, draft))
            .collect::<Result<Vec<_>>>()?;

        ExperimentSet::new(dimensions, instances, features, parameters, experiments).map(Arc::new)
    }
}

impl Context<ExperimentSetBuilder> {
    /// Replace the store configuration.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::FieldAlreadySet`], or
    /// [`Error::InvalidArgument`] once the dimensions are fixed.
    pub fn set_config(&self, config: StoreConfig) -> Result<()> {
        self.assign(ExperimentSetField::CONFIG, |b| {
            b.ensure_unfixed("the configuration")?;
            b.config = config;
            Ok(())
        })
    }

    /// Replace the storage specializer.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::FieldAlreadySet`], or
    /// [`Error::InvalidArgument`] once the dimensions are fixed.
    pub fn set_specializer(&self, specializer: Arc<dyn Specializer>) -> Result<()> {
        self.assign(ExperimentSetField::SPECIALIZER, |b| {
            b.ensure_unfixed("the specializer")?;
            b.specializer = specializer;
            Ok(())
        })
    }

    /// Open a child context for one dimension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn dimension_context(&self) -> Result<DimensionContext> {
        self.child(|_| Ok(DimensionBuilder::default()))
    }

    /// Add a dimension. Dimensions keep the order they are added in.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::InvalidArgument`] once the dimensions
    /// are fixed.
    pub fn add_dimension(&self, dimension: Dimension) -> Result<()> {
        self.update(ExperimentSetField::DIMENSION, |b| {
            b.ensure_unfixed("a dimension")?;
            b.dimensions.push(dimension);
            Ok(())
        })
    }

    /// Open a child context for one instance. Fixes the dimensions.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or the error of building the dimension set.
    pub fn instance_context(&self) -> Result<InstanceContext> {
        self.child(|b| Ok(InstanceBuilder::new(b.fix_dimensions()?)))
    }

    /// Add an instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn add_instance(&self, instance: InstanceDraft) -> Result<()> {
        self.update(ExperimentSetField::INSTANCE, |b| {
            b.instances.push(instance);
            Ok(())
        })
    }

    /// Open a child context for one experiment. Fixes the dimensions.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or the error of building the dimension set.
    pub fn experiment_context(&self) -> Result<ExperimentContext> {
        self.child(|b| Ok(ExperimentBuilder::new(b.fix_dimensions()?)))
    }

    /// Add an experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn add_experiment(&self, experiment: ExperimentDraft) -> Result<()> {
        self.update(ExperimentSetField::EXPERIMENT, |b| {
            b.experiments.push(experiment);
            Ok(())
        })
    }

    /// Append to the description of a feature.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::InvalidArgument`] for a blank name.
    pub fn describe_feature(&self, feature: &str, fragment: &str) -> Result<()> {
        self.update(ExperimentSetField::FEATURE_DESCRIPTION, |b| {
            describe(&mut b.feature_descriptions, feature, fragment)
        })
    }

    /// Append to the description of a parameter.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::InvalidArgument`] for a blank name.
    pub fn describe_parameter(&self, parameter: &str, fragment: &str) -> Result<()> {
        self.update(ExperimentSetField::PARAMETER_DESCRIPTION, |b| {
            describe(&mut b.parameter_descriptions, parameter, fragment)
        })
    }

    /// The dimension set, fixing it if it is not fixed yet.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or the error of building the dimension set.
    pub fn dimensions(&self) -> Result<Arc<DimensionSet>> {
        self.inspect(ExperimentSetBuilder::fix_dimensions)
    }
}
