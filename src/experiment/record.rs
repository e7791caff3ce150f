//! Experiment - one algorithm configuration and everything it produced

use std::cmp::Ordering;
use std::fmt;

use crate::dataset::{Arrangement, DataSet, SetElement, SetMember};
use crate::id::{
    compare_names, names_equivalent, normalize_name, IdObject, Membership, NamedIdObject,
    SetHandle,
};
use crate::instance::Instance;
use crate::property::ParameterSetting;
use crate::Result;

use super::InstanceRuns;

/// An algorithm configuration with its runs, grouped by instance.
#[derive(Debug, Clone)]
pub struct Experiment {
    membership: Membership,
    name: String,
    description: Option<String>,
    parameters: ParameterSetting,
    runs: DataSet<InstanceRuns>,
}

impl Experiment {
    /// Create a detached experiment.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a blank name
    /// * [`Error::EmptySet`](crate::Error::EmptySet) if there are no runs
    /// * [`Error::DuplicateElement`](crate::Error::DuplicateElement) if two
    ///   groups refer to the same instance
    pub fn new(
        name: &str,
        description: Option<String>,
        parameters: ParameterSetting,
        runs: Vec<InstanceRuns>,
    ) -> Result<Self> {
        let name = normalize_name(name)?;
        let membership = Membership::detached(&name);
        let runs = DataSet::new(SetHandle::nested(&membership), runs, Arrangement::Sorted)?;
        Ok(Self {
            membership,
            name,
            description,
            parameters,
            runs,
        })
    }

    /// Parameter values of this experiment.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSetting {
        &self.parameters
    }

    /// Runs grouped by instance, in instance order.
    #[must_use]
    pub fn instance_runs(&self) -> &DataSet<InstanceRuns> {
        &self.runs
    }

    /// Runs performed on `instance`, if any.
    #[must_use]
    pub fn runs_for(&self, instance: &Instance) -> Option<&InstanceRuns> {
        self.runs
            .search_by(|group| group.instance_index().cmp(&instance.index()))
            .filter(|group| group.instance_name() == instance.name())
    }

    /// Total number of runs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.iter().map(|group| group.runs().len()).sum()
    }

    /// Position in the owning set.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.membership.index()
    }
}

impl IdObject for Experiment {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl NamedIdObject for Experiment {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.membership.path())
    }
}

impl SetElement for Experiment {
    fn compare(&self, other: &Self) -> Ordering {
        compare_names(&self.name, &other.name)
    }

    fn equivalent(&self, other: &Self) -> bool {
        names_equivalent(&self.name, &other.name)
    }
}

impl SetMember for Experiment {
    fn bind(&mut self, owner: &SetHandle, index: usize) {
        self.membership = Membership::within(owner, index, &self.name);
        self.runs.rebind(SetHandle::nested(&self.membership));
    }
}
