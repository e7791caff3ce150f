//! Experiment builder

use std::sync::Arc;

use bitflags::bitflags;

use super::named::NamedFields;
use super::run::RunBuilder;
use super::{Builder, Context, RunContext};
use crate::dimension::DimensionSet;
use crate::id::names_equivalent;
use crate::property::Value;
use crate::run::Run;
use crate::{Error, Result};

bitflags! {
    /// Fields of an [`ExperimentBuilder`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExperimentField: u8 {
        /// Name
        const NAME = 1;
        /// Description fragments
        const DESCRIPTION = 1 << 1;
        /// Parameter values
        const PARAMETER = 1 << 2;
        /// Runs
        const RUN = 1 << 3;
    }
}

/// A compiled experiment waiting for its experiment set. Parameters and
/// instances are still referenced by name.
#[derive(Debug, Clone)]
pub struct ExperimentDraft {
    /// Normalized name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Parameter assignments in the order given
    pub parameters: Vec<(String, Value)>,
    /// Runs paired with the name of the instance they were performed on
    pub runs: Vec<(String, Run)>,
}

/// Accumulates the fields of an experiment.
#[derive(Debug)]
pub struct ExperimentBuilder {
    dimensions: Arc<DimensionSet>,
    named: NamedFields,
    parameters: Vec<(String, Value)>,
    runs: Vec<(String, Run)>,
}

/// Context building one experiment.
pub type ExperimentContext = Context<ExperimentBuilder>;

impl ExperimentBuilder {
    /// Builder for an experiment whose runs span `dimensions`.
    #[must_use]
    pub fn new(dimensions: Arc<DimensionSet>) -> Self {
        Self {
            dimensions,
            named: NamedFields::default(),
            parameters: Vec::new(),
            runs: Vec::new(),
        }
    }

    /// A fresh, unopened experiment context.
    #[must_use]
    pub fn context(dimensions: Arc<DimensionSet>) -> ExperimentContext {
        Context::new(Self::new(dimensions))
    }
}

impl Builder for ExperimentBuilder {
    type Field = ExperimentField;
    type Output = ExperimentDraft;

    const KIND: &'static str = "experiment";
    const REQUIRED: ExperimentField = ExperimentField::NAME.union(ExperimentField::RUN);
    const ALLOWS_CHILDREN: bool = true;

    fn build(&mut self) -> Result<ExperimentDraft> {
        Ok(ExperimentDraft {
            name: self.named.name(Self::KIND)?.to_string(),
            description: self.named.description(),
            parameters: std::mem::take(&mut self.parameters),
            runs: std::mem::take(&mut self.runs),
        })
    }
}

impl Context<ExperimentBuilder> {
    /// Set the name.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::FieldAlreadySet`], or
    /// [`Error::InvalidArgument`] for a blank name.
    pub fn set_name(&self, name: &str) -> Result<()> {
        self.assign(ExperimentField::NAME, |b| b.named.set_name(name))
    }

    /// Append a description fragment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn add_description(&self, fragment: &str) -> Result<()> {
        self.update(ExperimentField::DESCRIPTION, |b| {
            b.named.add_description(fragment);
            Ok(())
        })
    }

    /// Assign a parameter value.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::FieldAlreadySet`] if the parameter was
    /// already assigned.
    pub fn set_parameter(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update(ExperimentField::PARAMETER, |b| {
            if b.parameters.iter().any(|(n, _)| names_equivalent(n, name)) {
                return Err(Error::FieldAlreadySet {
                    context: ExperimentBuilder::KIND,
                    field: format!("parameter '{name}'"),
                });
            }
            b.parameters.push((name.trim().to_string(), value));
            Ok(())
        })
    }

    /// Record a run performed on the named instance.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::InvalidArgument`] if the run does not
    /// span this experiment's dimensions.
    pub fn add_run(&self, instance: &str, run: Run) -> Result<()> {
        self.update(ExperimentField::RUN, |b| {
            if run.layout().as_ref() != b.dimensions.layout().as_ref() {
                return Err(Error::InvalidArgument(format!(
                    "run for instance '{instance}' does not use the experiment's dimensions"
                )));
            }
            b.runs.push((instance.trim().to_string(), run));
            Ok(())
        })
    }

    /// Open a child context for one run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn run_context(&self) -> Result<RunContext> {
        self.child(|b| Ok(RunBuilder::new(Arc::clone(b.dimensions.factory()))))
    }
}
