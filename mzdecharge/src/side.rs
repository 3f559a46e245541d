//! The two sides of a compomer and the adducts collected on each of them
use std::collections::btree_map::{self, BTreeMap, Entry};
use std::fmt::Display;

use crate::adduct::Adduct;
use crate::compomer::CompomerError;

/// Selects one side of a [`Compomer`](crate::compomer::Compomer).
///
/// Adducts on the `Left` side are subtracted from the charge and mass balance,
/// adducts on the `Right` side are added. `Both` is a sentinel that names the
/// pair of sides and is never a valid argument to a side-aware operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left = 0,
    Right = 1,
    Both = 2,
}

impl Side {
    /// The storage slot for this side, failing for [`Side::Both`]
    #[inline]
    pub fn index(&self, operation: &'static str) -> Result<usize, CompomerError> {
        match self {
            Side::Left => Ok(0),
            Side::Right => Ok(1),
            Side::Both => Err(CompomerError::InvalidSide {
                operation,
                side: *self as u32,
            }),
        }
    }

    /// The sign applied to charge and mass contributions on this side.
    ///
    /// Only meaningful after [`Side::index`] has accepted the side.
    #[inline]
    pub fn multiplier(&self) -> i32 {
        match self {
            Side::Left => -1,
            _ => 1,
        }
    }
}

impl TryFrom<u32> for Side {
    type Error = CompomerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::Left),
            1 => Ok(Side::Right),
            2 => Ok(Side::Both),
            _ => Err(CompomerError::InvalidSide {
                operation: "Side::try_from",
                side: value,
            }),
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Both => "both",
        };
        f.write_str(name)
    }
}

/// The adducts applied to one side of a compomer, keyed by formula.
///
/// Each formula appears at most once. Inserting an adduct whose formula is
/// already present merges the amounts. Iteration is in lexicographic order of
/// the formulae.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompomerSide(BTreeMap<String, Adduct>);

impl CompomerSide {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, formula: &str) -> bool {
        self.0.contains_key(formula)
    }

    #[inline]
    pub fn get(&self, formula: &str) -> Option<&Adduct> {
        self.0.get(formula)
    }

    /// Add `adduct` to this side, merging its amount into an existing entry
    /// with the same formula.
    ///
    /// The per-unit constants of an existing entry are kept. A caller merging
    /// an adduct with different constants under the same formula gets a warning.
    pub fn insert(&mut self, adduct: &Adduct) {
        match self.0.entry(adduct.formula.clone()) {
            Entry::Vacant(e) => {
                e.insert(adduct.clone());
            }
            Entry::Occupied(mut e) => {
                let stored = e.get_mut();
                if !stored.same_species(adduct) {
                    tracing::warn!(
                        "Merging inconsistent adduct {adduct} into {stored}, keeping stored constants"
                    );
                }
                *stored += adduct;
            }
        }
    }

    /// Erase the entry for `formula`, returning it if it was present
    pub fn remove(&mut self, formula: &str) -> Option<Adduct> {
        self.0.remove(formula)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> btree_map::Values<'_, String, Adduct> {
        self.0.values()
    }

    pub fn formulas(&self) -> btree_map::Keys<'_, String, Adduct> {
        self.0.keys()
    }

    /// Whether `other` holds exactly the same formulae with the same amounts.
    ///
    /// Only this side's entries are scanned once the sizes are known to agree.
    pub fn same_composition(&self, other: &CompomerSide) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.0.iter().all(|(formula, adduct)| match other.get(formula) {
            Some(theirs) => theirs.amount == adduct.amount,
            None => false,
        })
    }
}

impl<'a> IntoIterator for &'a CompomerSide {
    type Item = &'a Adduct;

    type IntoIter = btree_map::Values<'a, String, Adduct>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Adduct> for CompomerSide {
    fn extend<T: IntoIterator<Item = Adduct>>(&mut self, iter: T) {
        for adduct in iter {
            self.insert(&adduct);
        }
    }
}

impl FromIterator<Adduct> for CompomerSide {
    fn from_iter<T: IntoIterator<Item = Adduct>>(iter: T) -> Self {
        let mut this = Self::default();
        this.extend(iter);
        this
    }
}
