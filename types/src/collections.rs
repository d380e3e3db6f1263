//! Bounded collections used in `BeaconState`.
//!
//! Indexing with `u64` is checked and reported through [`Error`] instead of panicking.
//! Elements can be modified in place, but only [`ContiguousList::push`] changes the length.

use core::{
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use arithmetic::U64Ext as _;
use derivative::Derivative;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use typenum::{NonZero, Unsigned};

#[derive(Debug, Error)]
pub enum Error {
    #[error("index out of bounds (index: {index}, length: {length})")]
    IndexOutOfBounds { index: u64, length: usize },
    #[error("list is full (maximum: {maximum})")]
    ListFull { maximum: u64 },
    #[error("list too long (maximum: {maximum}, actual: {actual})")]
    ListTooLong { maximum: u64, actual: usize },
    #[error("vector has wrong length (expected: {expected}, actual: {actual})")]
    VectorSizeMismatch { expected: u64, actual: usize },
}

/// Variable-length list with a maximum length of `N`.
#[derive(Derivative, Serialize)]
#[derivative(
    Clone(bound = "T: Clone"),
    PartialEq(bound = "T: PartialEq"),
    Eq(bound = "T: Eq"),
    Hash(bound = "T: Hash"),
    Default(bound = ""),
    Debug(bound = "T: Debug", transparent = "true")
)]
#[serde(transparent)]
pub struct ContiguousList<T, N> {
    elements: Vec<T>,
    #[derivative(Debug = "ignore")]
    #[serde(skip)]
    phantom: PhantomData<N>,
}

impl<T, N> Deref for ContiguousList<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.elements.as_slice()
    }
}

impl<T, N> DerefMut for ContiguousList<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.elements.as_mut_slice()
    }
}

impl<T, N: Unsigned> TryFrom<Vec<T>> for ContiguousList<T, N> {
    type Error = Error;

    fn try_from(elements: Vec<T>) -> Result<Self, Self::Error> {
        let maximum = N::U64;
        let actual = elements.len();

        if actual as u64 > maximum {
            return Err(Error::ListTooLong { maximum, actual });
        }

        Ok(Self {
            elements,
            phantom: PhantomData,
        })
    }
}

impl<'list, T, N> IntoIterator for &'list ContiguousList<T, N> {
    type Item = &'list T;
    type IntoIter = <&'list [T] as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'de, T: Deserialize<'de>, N: Unsigned> Deserialize<'de> for ContiguousList<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = Vec::deserialize(deserializer)?;
        elements.try_into().map_err(D::Error::custom)
    }
}

impl<T, N: Unsigned> ContiguousList<T, N> {
    pub fn push(&mut self, element: T) -> Result<(), Error> {
        let maximum = N::U64;

        if self.elements.len() as u64 >= maximum {
            return Err(Error::ListFull { maximum });
        }

        self.elements.push(element);

        Ok(())
    }

    pub fn get(&self, index: u64) -> Result<&T, Error> {
        let length = self.elements.len();

        usize::try_from(index)
            .ok()
            .and_then(|index| self.elements.get(index))
            .ok_or(Error::IndexOutOfBounds { index, length })
    }

    pub fn get_mut(&mut self, index: u64) -> Result<&mut T, Error> {
        let length = self.elements.len();

        usize::try_from(index)
            .ok()
            .and_then(|index| self.elements.get_mut(index))
            .ok_or(Error::IndexOutOfBounds { index, length })
    }

    #[must_use]
    pub fn len_u64(&self) -> u64 {
        self.elements.len() as u64
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

/// Fixed-length vector of exactly `N` elements used as a ring buffer.
#[derive(Derivative, Serialize)]
#[derivative(
    Clone(bound = "T: Clone"),
    PartialEq(bound = "T: PartialEq"),
    Eq(bound = "T: Eq"),
    Debug(bound = "T: Debug", transparent = "true")
)]
#[serde(transparent)]
pub struct ContiguousVector<T, N> {
    elements: Box<[T]>,
    #[derivative(Debug = "ignore")]
    #[serde(skip)]
    phantom: PhantomData<N>,
}

impl<T: Clone + Default, N: Unsigned + NonZero> Default for ContiguousVector<T, N> {
    fn default() -> Self {
        Self::full(T::default())
    }
}

impl<T, N> Deref for ContiguousVector<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl<T, N: Unsigned> TryFrom<Vec<T>> for ContiguousVector<T, N> {
    type Error = Error;

    fn try_from(elements: Vec<T>) -> Result<Self, Self::Error> {
        let expected = N::U64;
        let actual = elements.len();

        if actual as u64 != expected {
            return Err(Error::VectorSizeMismatch { expected, actual });
        }

        Ok(Self {
            elements: elements.into_boxed_slice(),
            phantom: PhantomData,
        })
    }
}

impl<'de, T: Deserialize<'de>, N: Unsigned> Deserialize<'de> for ContiguousVector<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = Vec::deserialize(deserializer)?;
        elements.try_into().map_err(D::Error::custom)
    }
}

impl<T, N: Unsigned + NonZero> ContiguousVector<T, N> {
    #[must_use]
    pub fn full(element: T) -> Self
    where
        T: Clone,
    {
        Self {
            elements: vec![element; N::USIZE].into_boxed_slice(),
            phantom: PhantomData,
        }
    }

    /// Returns the element at `index mod N`.
    ///
    /// Callers looking up per-epoch data must not go back more than `N` epochs.
    /// Older entries have already been overwritten.
    #[must_use]
    pub fn mod_index(&self, index: u64) -> &T {
        self.elements
            .get(Self::position(index))
            .expect("any number below N is a valid index because self contains exactly N elements")
    }

    pub fn mod_index_mut(&mut self, index: u64) -> &mut T {
        self.elements
            .get_mut(Self::position(index))
            .expect("any number below N is a valid index because self contains exactly N elements")
    }

    fn position(index: u64) -> usize {
        usize::try_from(index.mod_typenum::<N>())
            .expect("N fits in usize because self contains exactly N elements")
    }
}
