//! Ordered-set container
//!
//! A [`DataSet`] is an immutable, duplicate-free array. Construction sorts the
//! input (unless the caller's order is the order), binds every element to the
//! set, and then validates the whole array. Validation is quadratic in the
//! number of elements; it runs once at load time, never at query time.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

use tracing::debug;

use crate::id::{IdObject, SetHandle};
use crate::{Error, Result};

/// Order and equality contract of elements stored in a [`DataSet`].
pub trait SetElement: fmt::Display {
    /// Total order of elements within one set.
    fn compare(&self, other: &Self) -> Ordering;

    /// Whether two elements denote the same entity.
    fn equivalent(&self, other: &Self) -> bool;
}

/// Elements that record which set they belong to.
pub trait SetMember: SetElement {
    /// Record the owner and position. Called exactly once per set construction.
    fn bind(&mut self, owner: &SetHandle, index: usize);
}

/// How a [`DataSet`] arranges its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// Sort by [`SetElement::compare`] before binding.
    Sorted,
    /// Keep the caller's order; the comparator must agree with it after binding.
    AsGiven,
}

/// Immutable, sorted, duplicate-free array of set members.
#[derive(Debug, Clone)]
pub struct DataSet<T> {
    handle: SetHandle,
    elements: Box<[T]>,
}

impl<T: SetMember> DataSet<T> {
    /// Build and validate a set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`] for empty input, [`Error::DuplicateElement`]
    /// if two elements are equivalent, and [`Error::ComparatorContract`] if any
    /// adjacent pair is not strictly ordered in both directions.
    pub fn new(handle: SetHandle, mut elements: Vec<T>, arrangement: Arrangement) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::EmptySet(handle.path().to_string()));
        }
        if arrangement == Arrangement::Sorted {
            elements.sort_by(SetElement::compare);
        }
        for (index, element) in elements.iter_mut().enumerate() {
            element.bind(&handle, index);
        }
        validate_elements(handle.path(), &elements)?;
        debug!(set = handle.path(), id = handle.id(), size = elements.len(), "validated data set");
        Ok(Self {
            handle,
            elements: elements.into_boxed_slice(),
        })
    }

    /// Move the set under a new handle, rebinding every element.
    pub(crate) fn rebind(&mut self, handle: SetHandle) {
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.bind(&handle, index);
        }
        self.handle = handle;
    }
}

impl<T> DataSet<T> {
    /// The set's handle.
    #[must_use]
    pub const fn handle(&self) -> &SetHandle {
        &self.handle
    }

    /// The validated elements.
    #[must_use]
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Binary search with a caller-supplied probe.
    pub fn search_by(&self, probe: impl FnMut(&T) -> Ordering) -> Option<&T> {
        self.elements
            .binary_search_by(probe)
            .ok()
            .map(|index| &self.elements[index])
    }
}

impl<T> Deref for DataSet<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.elements
    }
}

impl<'a, T> IntoIterator for &'a DataSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T> IdObject for DataSet<T> {
    fn id(&self) -> u64 {
        self.handle.id()
    }

    fn path(&self) -> &str {
        self.handle.path()
    }
}

/// Check pairwise distinctness and strict adjacent ordering of `elements`.
///
/// # Errors
///
/// See [`DataSet::new`].
pub fn validate_elements<T: SetElement>(set: &str, elements: &[T]) -> Result<()> {
    for (i, first) in elements.iter().enumerate() {
        for second in &elements[i + 1..] {
            if first.equivalent(second) || second.equivalent(first) {
                return Err(Error::DuplicateElement {
                    set: set.to_string(),
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }

    for pair in elements.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        let forward = before.compare(after);
        let backward = after.compare(before);
        let detail = match (forward, backward) {
            (Ordering::Less, Ordering::Greater) => continue,
            (Ordering::Equal, Ordering::Equal) => {
                "distinct elements compare as equal in both directions"
            }
            (Ordering::Equal, _) | (_, Ordering::Equal) => {
                "comparison is equal in one direction only"
            }
            _ => "elements are out of order or compare with contradictory signs",
        };
        return Err(Error::ComparatorContract {
            set: set.to_string(),
            first: before.to_string(),
            second: after.to_string(),
            detail: detail.to_string(),
        });
    }
    Ok(())
}
