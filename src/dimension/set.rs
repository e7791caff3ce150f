//! The ordered dimensions of an experiment set and their storage strategy

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::backend::{select_factory, Specializer, Unavailable};
use crate::config::StoreConfig;
use crate::dataset::{Arrangement, DataSet};
use crate::id::{names_equivalent, IdObject, NamedIdObject, SetHandle, SetKind};
use crate::storage::{DataFactory, PointLayout};
use crate::Result;

use super::Dimension;

/// Dimensions in column order, plus the data factory bound to that order.
#[derive(Debug, Clone)]
pub struct DimensionSet {
    dimensions: DataSet<Dimension>,
    layout: Arc<PointLayout>,
    factory: Arc<dyn DataFactory>,
}

impl DimensionSet {
    /// Build a set with the long-encoded storage strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`](crate::Error::EmptySet) for no dimensions
    /// and [`Error::DuplicateElement`](crate::Error::DuplicateElement) if two
    /// names differ only in case.
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        Self::with_backend(dimensions, &StoreConfig::default(), &Unavailable)
    }

    /// Build a set, asking `specializer` for a storage strategy when the
    /// configuration allows it.
    ///
    /// # Errors
    ///
    /// See [`DimensionSet::new`].
    pub fn with_backend(
        dimensions: Vec<Dimension>,
        config: &StoreConfig,
        specializer: &dyn Specializer,
    ) -> Result<Self> {
        let dimensions = DataSet::new(
            SetHandle::root(SetKind::Dimensions),
            dimensions,
            Arrangement::AsGiven,
        )?;
        let layout = Arc::new(PointLayout::new(
            dimensions.iter().map(Dimension::column_spec).collect(),
        ));
        let parsers = dimensions.iter().map(|d| Arc::clone(d.parser())).collect();
        let factory = select_factory(config, specializer, Arc::clone(&layout), parsers);
        Ok(Self {
            dimensions,
            layout,
            factory,
        })
    }

    /// Dimension with the given name, compared case-insensitively.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| names_equivalent(d.name(), name))
    }

    /// Column layout of the data points.
    #[must_use]
    pub fn layout(&self) -> &Arc<PointLayout> {
        &self.layout
    }

    /// Storage strategy of the data points.
    #[must_use]
    pub fn factory(&self) -> &Arc<dyn DataFactory> {
        &self.factory
    }
}

impl Deref for DimensionSet {
    type Target = DataSet<Dimension>;

    fn deref(&self) -> &DataSet<Dimension> {
        &self.dimensions
    }
}

impl IdObject for DimensionSet {
    fn id(&self) -> u64 {
        self.dimensions.id()
    }

    fn path(&self) -> &str {
        self.dimensions.path()
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path(), self.id())
    }
}
