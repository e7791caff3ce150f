//! Builder lifecycle state machine

use std::fmt;

use bitflags::Flags;

use crate::{Error, Result};

/// Lifecycle state of a builder context. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Created, not yet opened
    Nothing,
    /// Accepting field assignments
    Open,
    /// No more assignments; ready to compile
    Closed,
    /// Build step running, or failed
    Compiling,
    /// Result available
    Compiled,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nothing => "nothing",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Compiling => "compiling",
            Self::Compiled => "compiled",
        })
    }
}

/// State plus the mask of fields assigned so far.
#[derive(Debug, Clone)]
pub(crate) struct Fsm<F> {
    kind: &'static str,
    state: State,
    assigned: F,
}

impl<F: Flags + Copy> Fsm<F> {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: State::Nothing,
            assigned: F::empty(),
        }
    }

    pub(crate) const fn state(&self) -> State {
        self.state
    }

    fn expect(&self, operation: &'static str, expected: State) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::Lifecycle {
                context: self.kind,
                operation,
                expected,
                actual: self.state,
            })
        }
    }

    pub(crate) fn open(&mut self) -> Result<()> {
        self.expect("open", State::Nothing)?;
        self.state = State::Open;
        Ok(())
    }

    pub(crate) fn require_open(&self, operation: &'static str) -> Result<()> {
        self.expect(operation, State::Open)
    }

    /// Fail if a set-once `field` was already assigned.
    pub(crate) fn check_unset(&self, field: F) -> Result<()> {
        self.require_open("set a field of")?;
        if self.assigned.contains(field) {
            return Err(Error::FieldAlreadySet {
                context: self.kind,
                field: names(field).join("|"),
            });
        }
        Ok(())
    }

    pub(crate) fn mark(&mut self, field: F) {
        self.assigned.insert(field);
    }

    pub(crate) fn close(&mut self) -> Result<()> {
        self.expect("close", State::Open)?;
        self.state = State::Closed;
        Ok(())
    }

    /// Enter `Compiling` if the context is closed and `required` is complete.
    pub(crate) fn begin_compile(&mut self, required: F) -> Result<()> {
        self.expect("compile", State::Closed)?;
        let missing = required.difference(self.assigned);
        if !missing.is_empty() {
            return Err(Error::MissingFields {
                context: self.kind,
                missing: names(missing).join(", "),
            });
        }
        self.state = State::Compiling;
        Ok(())
    }

    pub(crate) fn finish_compile(&mut self) {
        self.state = State::Compiled;
    }

    pub(crate) fn require_compiled(&self) -> Result<()> {
        self.expect("read the result of", State::Compiled)
    }
}

fn names<F: Flags>(flags: F) -> Vec<&'static str> {
    flags.iter_names().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Fields: u8 {
            const A = 1;
            const B = 1 << 1;
        }
    }

    #[test]
    fn test_forward_only() {
        let mut fsm = Fsm::<Fields>::new("test");
        assert_eq!(fsm.state(), State::Nothing);
        fsm.open().unwrap();
        assert!(fsm.open().is_err());
        fsm.close().unwrap();
        assert!(matches!(
            fsm.close(),
            Err(Error::Lifecycle {
                expected: State::Open,
                actual: State::Closed,
                ..
            })
        ));
    }

    #[test]
    fn test_set_once() {
        let mut fsm = Fsm::<Fields>::new("test");
        assert!(fsm.check_unset(Fields::A).is_err());
        fsm.open().unwrap();
        fsm.check_unset(Fields::A).unwrap();
        fsm.mark(Fields::A);
        match fsm.check_unset(Fields::A) {
            Err(Error::FieldAlreadySet { field, .. }) => assert_eq!(field, "A"),
            other => panic!("expected field error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields() {
        let mut fsm = Fsm::<Fields>::new("test");
        fsm.open().unwrap();
        fsm.mark(Fields::A);
        fsm.close().unwrap();
        match fsm.begin_compile(Fields::A | Fields::B) {
            Err(Error::MissingFields { missing, .. }) => assert_eq!(missing, "B"),
            other => panic!("expected missing fields, got {other:?}"),
        }
        assert_eq!(fsm.state(), State::Closed);
    }

    #[test]
    fn test_compile() {
        let mut fsm = Fsm::<Fields>::new("test");
        fsm.open().unwrap();
        fsm.mark(Fields::A);
        fsm.close().unwrap();
        assert!(fsm.require_compiled().is_err());
        fsm.begin_compile(Fields::A).unwrap();
        assert_eq!(fsm.state(), State::Compiling);
        fsm.finish_compile();
        fsm.require_compiled().unwrap();
    }
}
