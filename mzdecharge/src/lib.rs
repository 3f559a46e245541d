//! Adduct compomers for resolving charge state and adduct ambiguity between
//! features of a mass spectrometry feature map.
//!
//! A [`Compomer`] explains the mass and charge difference between two
//! features by a set of [`Adduct`]s removed on its left side and added on its
//! right side. A charge-ladder search builds candidate compomers with
//! [`Compomer::add`], rejects incompatible pairs with
//! [`Compomer::is_conflicting`], and ranks the survivors with
//! [`sort_compomers`] and [`dedup_compomers`].
pub mod adduct;
pub mod compomer;
pub mod formula;
pub mod side;

pub use crate::adduct::{Adduct, PROTON};
pub use crate::compomer::{dedup_compomers, sort_compomers, Compomer, CompomerError};
pub use crate::formula::FormulaError;
pub use crate::side::{CompomerSide, Side};
