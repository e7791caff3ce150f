//! Builder contexts
//!
//! Every mutable builder is wrapped in a [`Context`]: a lock-guarded state
//! machine that accepts field assignments while `Open`, checks that all
//! required fields were supplied, runs the build step exactly once and caches
//! its result.
//!
//! ```text
//! Nothing --open--> Open --close--> Closed --compile--> Compiling --> Compiled
//! ```
//!
//! Contexts that assemble containers may open child contexts; leaf contexts
//! (dimension, instance, run) may not.

mod dimension;
mod experiment;
mod experiment_set;
mod fsm;
mod instance;
mod named;
mod run;

pub use dimension::{DimensionBuilder, DimensionContext, DimensionField};
pub use experiment::{ExperimentBuilder, ExperimentContext, ExperimentDraft, ExperimentField};
pub use experiment_set::{ExperimentSetBuilder, ExperimentSetContext, ExperimentSetField};
pub use fsm::State;
pub use instance::{InstanceBuilder, InstanceContext, InstanceDraft, InstanceField};
pub use named::join_description;
pub use run::{RunBuilder, RunContext, RunField};

use std::fmt;

use bitflags::Flags;
use parking_lot::Mutex;

use crate::{Error, Result};
use fsm::Fsm;

/// Accumulates fields and produces one immutable value.
pub trait Builder: Send {
    /// Field mask type.
    type Field: Flags + Copy + Send;
    /// Compiled value.
    type Output: Clone + Send;

    /// Name used in lifecycle errors.
    const KIND: &'static str;
    /// Fields that must be assigned before compiling.
    const REQUIRED: Self::Field;
    /// Whether child contexts may be opened.
    const ALLOWS_CHILDREN: bool = false;

    /// Build the value from the accumulated fields. Called at most once.
    ///
    /// # Errors
    ///
    /// Any validation error of the value being built.
    fn build(&mut self) -> Result<Self::Output>;
}

struct Core<B: Builder> {
    fsm: Fsm<B::Field>,
    builder: B,
    result: Option<B::Output>,
}

/// Lifecycle-controlled wrapper around a [`Builder`].
pub struct Context<B: Builder> {
    inner: Mutex<Core<B>>,
}

impl<B: Builder> Context<B> {
    /// Wrap `builder` in a fresh context.
    #[must_use]
    pub fn new(builder: B) -> Self {
        Self {
            inner: Mutex::new(Core {
                fsm: Fsm::new(B::KIND),
                builder,
                result: None,
            }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> State {
        self.inner.lock().fsm.state()
    }

    /// `Nothing -> Open`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] in any other state.
    pub fn open(&self) -> Result<()> {
        self.inner.lock().fsm.open()
    }

    /// `Open -> Closed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] in any other state.
    pub fn close(&self) -> Result<()> {
        self.inner.lock().fsm.close()
    }

    /// `Closed -> Compiling -> Compiled`, running the build step.
    ///
    /// A failed build leaves the context in `Compiling`; it cannot be
    /// compiled again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] if not closed, [`Error::MissingFields`] if
    /// a required field was never assigned, or the build step's error.
    pub fn compile(&self) -> Result<()> {
        let mut core = self.inner.lock();
        core.fsm.begin_compile(B::REQUIRED)?;
        let output = core.builder.build()?;
        core.result = Some(output);
        core.fsm.finish_compile();
        Ok(())
    }

    /// The compiled value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless compiled.
    pub fn result(&self) -> Result<B::Output> {
        let core = self.inner.lock();
        core.fsm.require_compiled()?;
        core.result.clone().ok_or(Error::Lifecycle {
            context: B::KIND,
            operation: "read the result of",
            expected: State::Compiled,
            actual: core.fsm.state(),
        })
    }

    /// Close, compile and return the result.
    ///
    /// # Errors
    ///
    /// See [`Context::close`], [`Context::compile`] and [`Context::result`].
    pub fn finish(&self) -> Result<B::Output> {
        self.close()?;
        self.compile()?;
        self.result()
    }

    /// Open a child context for `child`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChildNotAllowed`] for leaf contexts and
    /// [`Error::Lifecycle`] unless open.
    pub fn open_child<C: Builder>(&self, child: C) -> Result<Context<C>> {
        self.child(|_| Ok(child))
    }

    pub(crate) fn child<C: Builder>(
        &self,
        make: impl FnOnce(&mut B) -> Result<C>,
    ) -> Result<Context<C>> {
        if !B::ALLOWS_CHILDREN {
            return Err(Error::ChildNotAllowed(B::KIND));
        }
        let mut core = self.inner.lock();
        core.fsm.require_open("open a child of")?;
        make(&mut core.builder).map(Context::new)
    }

    /// Assign a set-once field. `apply` runs only while open and before the
    /// field is marked; if it fails the field stays unset.
    pub(crate) fn assign<R>(
        &self,
        field: B::Field,
        apply: impl FnOnce(&mut B) -> Result<R>,
    ) -> Result<R> {
        let mut core = self.inner.lock();
        core.fsm.check_unset(field)?;
        let out = apply(&mut core.builder)?;
        core.fsm.mark(field);
        Ok(out)
    }

    /// Assign a repeatable field.
    pub(crate) fn update<R>(
        &self,
        field: B::Field,
        apply: impl FnOnce(&mut B) -> Result<R>,
    ) -> Result<R> {
        let mut core = self.inner.lock();
        core.fsm.require_open("update")?;
        let out = apply(&mut core.builder)?;
        core.fsm.mark(field);
        Ok(out)
    }

    /// Read builder state while open.
    pub(crate) fn inspect<R>(&self, read: impl FnOnce(&mut B) -> Result<R>) -> Result<R> {
        let mut core = self.inner.lock();
        core.fsm.require_open("inspect")?;
        read(&mut core.builder)
    }
}

impl<B: Builder> fmt::Debug for Context<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("kind", &B::KIND)
            .field("state", &self.state())
            .finish()
    }
}
