//! Runs of one experiment on one instance

use std::cmp::Ordering;
use std::fmt;

use crate::dataset::{Arrangement, DataSet, SetElement, SetMember};
use crate::id::{IdObject, Membership, NamedIdObject, SetHandle};
use crate::instance::Instance;
use crate::run::Run;
use crate::Result;

/// The runs an experiment performed on a single instance.
#[derive(Debug, Clone)]
pub struct InstanceRuns {
    membership: Membership,
    instance: usize,
    instance_name: String,
    runs: DataSet<Run>,
}

impl InstanceRuns {
    /// Group `runs` under `instance`. Runs are sorted; identical runs are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`](crate::Error::EmptySet) for no runs and
    /// [`Error::DuplicateElement`](crate::Error::DuplicateElement) for
    /// identical runs.
    pub fn new(instance: &Instance, runs: Vec<Run>) -> Result<Self> {
        let membership = Membership::detached(instance.name());
        let runs = DataSet::new(SetHandle::nested(&membership), runs, Arrangement::Sorted)?;
        Ok(Self {
            membership,
            instance: instance.index(),
            instance_name: instance.name().to_string(),
            runs,
        })
    }

    /// Index of the instance in the experiment set's instance set.
    #[must_use]
    pub const fn instance_index(&self) -> usize {
        self.instance
    }

    /// Name of the instance.
    #[must_use]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// The runs, sorted.
    #[must_use]
    pub fn runs(&self) -> &DataSet<Run> {
        &self.runs
    }
}

impl IdObject for InstanceRuns {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl fmt::Display for InstanceRuns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} runs)", self.membership.path(), self.runs.len())
    }
}

impl SetElement for InstanceRuns {
    fn compare(&self, other: &Self) -> Ordering {
        self.instance.cmp(&other.instance)
    }

    fn equivalent(&self, other: &Self) -> bool {
        self.instance == other.instance
    }
}

impl SetMember for InstanceRuns {
    fn bind(&mut self, owner: &SetHandle, index: usize) {
        self.membership = Membership::within(owner, index, &self.instance_name);
        self.runs.rebind(SetHandle::nested(&self.membership));
    }
}
