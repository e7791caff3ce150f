//! Identity and ordering kernel
//!
//! Top-level containers draw their ids from global atomic counters, one per
//! [`SetKind`]. Elements of a container are identified by their index in it.
//! Elements refer back to their owner through a [`Membership`]: the owner id,
//! the index, and the hierarchical path used for diagnostics. These are plain
//! values, so the compiled graph has no reference cycles.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::{Error, Result};

/// Kinds of top-level containers with their own id counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// A [`DimensionSet`](crate::dimension::DimensionSet)
    Dimensions,
    /// An [`InstanceSet`](crate::instance::InstanceSet)
    Instances,
    /// A [`FeatureSet`](crate::property::FeatureSet)
    Features,
    /// A [`ParameterSet`](crate::property::ParameterSet)
    Parameters,
    /// An [`ExperimentSet`](crate::experiment::ExperimentSet)
    Experiments,
}

static COUNTERS: [AtomicU64; 5] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];

impl SetKind {
    /// Root segment of the textual path of sets of this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dimensions => "dimensions",
            Self::Instances => "instances",
            Self::Features => "features",
            Self::Parameters => "parameters",
            Self::Experiments => "experiments",
        }
    }

    /// Draw the next id for this kind. Ids start at 1 and are unique per kind
    /// across all threads.
    #[must_use]
    pub fn next_id(self) -> u64 {
        COUNTERS[self as usize].fetch_add(1, AtomicOrdering::Relaxed) + 1
    }
}

/// Identity of a container: its id and its textual path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetHandle {
    id: u64,
    path: Arc<str>,
}

impl SetHandle {
    /// Handle for a fresh top-level container of the given kind.
    #[must_use]
    pub fn root(kind: SetKind) -> Self {
        Self {
            id: kind.next_id(),
            path: Arc::from(kind.label()),
        }
    }

    /// Handle for a container nested inside an element, e.g. the runs of one
    /// instance inside an experiment. The id is the element's index.
    #[must_use]
    pub fn nested(owner: &Membership) -> Self {
        Self {
            id: owner.index() as u64,
            path: Arc::clone(&owner.path),
        }
    }

    /// Container id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Container path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Non-owning back-reference of an element to its container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Membership {
    owner: u64,
    index: usize,
    path: Arc<str>,
}

impl Membership {
    /// Membership of an element not yet placed in any container.
    #[must_use]
    pub fn detached(name: &str) -> Self {
        Self {
            owner: 0,
            index: 0,
            path: Arc::from(name),
        }
    }

    /// Membership at `index` of `owner`, rendered as `owner-path/name`.
    #[must_use]
    pub fn within(owner: &SetHandle, index: usize, name: &str) -> Self {
        Self {
            owner: owner.id(),
            index,
            path: Arc::from(format!("{}/{name}", owner.path()).as_str()),
        }
    }

    /// Id of the owning container, `0` while detached.
    #[must_use]
    pub const fn owner(&self) -> u64 {
        self.owner
    }

    /// Index within the owning container.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Hierarchical path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Anything with a stable integer id and a textual path.
pub trait IdObject {
    /// Stable id: the global id for containers, the index for elements.
    fn id(&self) -> u64;

    /// `parent/.../name` rendering for diagnostics. Not a serialization format.
    fn path(&self) -> &str;
}

/// An [`IdObject`] with a normalized name and an optional description.
pub trait NamedIdObject: IdObject {
    /// Normalized, non-empty name.
    fn name(&self) -> &str;

    /// Free-form description.
    fn description(&self) -> Option<&str>;
}

/// Deterministic name order: case-insensitive first, then case-sensitive.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Names that differ only in case denote the same entity.
#[must_use]
pub fn names_equivalent(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Trim and collapse whitespace runs into single spaces.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if nothing remains.
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "name '{raw}' is empty after normalization"
        )));
    }
    Ok(name)
}
