//! Storage strategy dispatcher
//!
//! A dimension set stores its points through a [`DataFactory`]. An optional
//! [`Specializer`] may provide a factory tailored to one column layout; the
//! long-encoded factory is always available and defines the semantics any
//! specialized factory must reproduce.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{SpecializationMode, StoreConfig};
use crate::parser::NumberParser;
use crate::storage::{DataFactory, LongEncodedDataFactory, PointLayout};
use crate::Result;

/// Service generating layout-specific storage strategies.
pub trait Specializer: Send + Sync + fmt::Debug {
    /// Whether the service can be used in this process.
    fn available(&self) -> bool;

    /// Build a factory for `layout`.
    ///
    /// # Errors
    ///
    /// Any error is non-fatal: the caller falls back to the long-encoded
    /// factory.
    fn build(
        &self,
        layout: &Arc<PointLayout>,
        parsers: &[Arc<dyn NumberParser>],
    ) -> Result<Arc<dyn DataFactory>>;
}

/// The absent specializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl Specializer for Unavailable {
    fn available(&self) -> bool {
        false
    }

    fn build(
        &self,
        layout: &Arc<PointLayout>,
        parsers: &[Arc<dyn NumberParser>],
    ) -> Result<Arc<dyn DataFactory>> {
        Ok(Arc::new(LongEncodedDataFactory::new(
            Arc::clone(layout),
            parsers.to_vec(),
        )))
    }
}

/// Pick the storage strategy for `layout`.
///
/// Falls back to [`LongEncodedDataFactory`] when specialization is disabled,
/// unavailable, or fails.
#[must_use]
pub fn select_factory(
    config: &StoreConfig,
    specializer: &dyn Specializer,
    layout: Arc<PointLayout>,
    parsers: Vec<Arc<dyn NumberParser>>,
) -> Arc<dyn DataFactory> {
    let fallback = |layout: Arc<PointLayout>, parsers: Vec<Arc<dyn NumberParser>>| {
        Arc::new(LongEncodedDataFactory::new(layout, parsers)) as Arc<dyn DataFactory>
    };

    if config.specialization == SpecializationMode::Disabled {
        debug!(columns = layout.len(), "specialization disabled, using long-encoded storage");
        return fallback(layout, parsers);
    }
    if !specializer.available() {
        info!(
            columns = layout.len(),
            "specialized data points unavailable, using long-encoded storage"
        );
        return fallback(layout, parsers);
    }
    match specializer.build(&layout, &parsers) {
        Ok(factory) => {
            debug!(factory = factory.name(), columns = layout.len(), "using specialized storage");
            factory
        }
        Err(e) => {
            warn!(error = %e, "specialization failed, using long-encoded storage");
            fallback(layout, parsers)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionDirection, DimensionType};
    use crate::parser::default_parser;
    use crate::storage::{ColumnSpec, DataPointRef, NumericValue, PrimitiveType};
    use crate::Error;

    /// Specializer that wraps the long-encoded factory under another name.
    #[derive(Debug)]
    struct Renamed {
        fail: bool,
    }

    #[derive(Debug)]
    struct RenamedFactory(LongEncodedDataFactory);

    impl DataFactory for RenamedFactory {
        fn name(&self) -> &'static str {
            "renamed"
        }

        fn layout(&self) -> &Arc<PointLayout> {
            self.0.layout()
        }

        fn parsers(&self) -> &[Arc<dyn NumberParser>] {
            self.0.parsers()
        }

        fn store(&self, values: Vec<NumericValue>) -> DataPointRef {
            self.0.store(values)
        }
    }

    impl Specializer for Renamed {
        fn available(&self) -> bool {
            true
        }

        fn build(
            &self,
            layout: &Arc<PointLayout>,
            parsers: &[Arc<dyn NumberParser>],
        ) -> Result<Arc<dyn DataFactory>> {
            if self.fail {
                return Err(Error::InvalidArgument("no code generator".to_string()));
            }
            Ok(Arc::new(RenamedFactory(LongEncodedDataFactory::new(
                Arc::clone(layout),
                parsers.to_vec(),
            ))))
        }
    }

    fn layout() -> (Arc<PointLayout>, Vec<Arc<dyn NumberParser>>) {
        let layout = Arc::new(PointLayout::new(vec![ColumnSpec {
            name: "t".to_string(),
            primitive_type: PrimitiveType::Long,
            direction: DimensionDirection::Increasing,
            dimension_type: DimensionType::RuntimeCpu,
        }]));
        (layout, vec![default_parser(PrimitiveType::Long)])
    }

    #[test]
    fn test_unavailable_falls_back() {
        let (layout, parsers) = layout();
        let factory = select_factory(&StoreConfig::default(), &Unavailable, layout, parsers);
        assert_eq!(factory.name(), "long-encoded");
    }

    #[test]
    fn test_uses_available_specializer() {
        let (layout, parsers) = layout();
        let factory = select_factory(
            &StoreConfig::default(),
            &Renamed { fail: false },
            layout,
            parsers,
        );
        assert_eq!(factory.name(), "renamed");
        assert_eq!(factory.parse_string("4").unwrap().get_long(0), 4);
    }

    #[test]
    fn test_failing_specializer_falls_back() {
        let (layout, parsers) = layout();
        let factory = select_factory(
            &StoreConfig::default(),
            &Renamed { fail: true },
            layout,
            parsers,
        );
        assert_eq!(factory.name(), "long-encoded");
    }

    #[test]
    fn test_disabled_ignores_specializer() {
        let (layout, parsers) = layout();
        let config = StoreConfig::default().with_specialization(SpecializationMode::Disabled);
        let factory = select_factory(&config, &Renamed { fail: false }, layout, parsers);
        assert_eq!(factory.name(), "long-encoded");
    }
}
