/*! Compomers, signed combinations of adducts explaining the relationship between two features */
use std::cmp::Ordering;
use std::fmt::Display;

use itertools::Itertools;
use num_traits::Float;
use thiserror::Error;

use crate::adduct::Adduct;
use crate::formula::{render_composition, sum_formulas, FormulaError};
use crate::side::{CompomerSide, Side};

pub(crate) fn isclose<T: Float>(a: T, b: T, delta: T) -> bool {
    (a - b).abs() < delta
}

/// An error that might occur while building or inspecting a [`Compomer`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompomerError {
    #[error("{operation} received invalid side selector {side}, expected 0 (left) or 1 (right)")]
    InvalidSide { operation: &'static str, side: u32 },
    #[error(transparent)]
    InvalidFormula(#[from] FormulaError),
}

/// A hypothesized combination of adducts split over a `Left` side, whose
/// contributions are subtracted, and a `Right` side, whose contributions are
/// added, explaining the charge and mass difference between two features.
///
/// The scalar totals are maintained incrementally by [`Compomer::add`] and the
/// `remove_adduct*` methods and are never recomputed from the sides. Floating
/// point totals therefore depend on the order of operations and should be
/// compared with a tolerance, see [`Compomer::is_close`].
///
/// The `id` is caller-assigned metadata. It is carried along by copies but takes
/// no part in equality or ordering.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compomer {
    sides: [CompomerSide; 2],
    net_charge: i32,
    mass: f64,
    positive_charges: i32,
    negative_charges: i32,
    log_p: f64,
    rt_shift: f64,
    id: usize,
}

impl Compomer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compomer without adducts, starting from the given totals.
    ///
    /// A compomer with `log_p` of [`f64::MIN`] is a convenient "no hit yet"
    /// sentinel when searching for the most probable explanation.
    pub fn with_totals(net_charge: i32, mass: f64, log_p: f64) -> Self {
        Self {
            net_charge,
            mass,
            log_p,
            ..Default::default()
        }
    }

    /// Add `adduct` to `side`, merging with any adduct of the same formula
    /// already there, and update the running totals.
    ///
    /// Fails before touching any state if `side` is [`Side::Both`]. A non-positive
    /// amount or charge is accepted with a warning. Integer totals wrap on
    /// overflow.
    pub fn add(&mut self, adduct: &Adduct, side: Side) -> Result<(), CompomerError> {
        let slot = side.index("Compomer::add")?;
        if adduct.amount <= 0 || adduct.charge <= 0 {
            tracing::warn!(
                "Adding adduct {adduct} with non-positive amount or charge to the {side} side"
            );
        }

        let mult = side.multiplier();
        let charge = adduct.amount.wrapping_mul(adduct.charge).wrapping_mul(mult);
        self.net_charge = self.net_charge.wrapping_add(charge);
        self.mass += adduct.amount as f64 * adduct.single_mass * mult as f64;
        self.positive_charges = self.positive_charges.wrapping_add(charge.max(0));
        self.negative_charges = self.negative_charges.wrapping_sub(charge.min(0));
        self.log_p += adduct.amount.unsigned_abs() as f64 * adduct.log_prob;
        self.rt_shift += adduct.amount as f64 * adduct.rt_shift * mult as f64;
        self.sides[slot].insert(adduct);

        tracing::trace!(
            "Added {} x{} to the {side} side, q_net={} mass={}",
            adduct.formula,
            adduct.amount,
            self.net_charge,
            self.mass
        );
        Ok(())
    }

    /// Add every adduct of `adducts` to `side`, in the iteration order of `adducts`
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn add_side(&mut self, adducts: &CompomerSide, side: Side) -> Result<(), CompomerError> {
        side.index("Compomer::add_side")?;
        for adduct in adducts {
            self.add(adduct, side)?;
        }
        Ok(())
    }

    /// Roll back all of `adduct` on a side already known to be valid.
    ///
    /// The quantity removed is the amount currently stored for the formula, while
    /// the per-unit charge, mass, log-probability and retention time shift come
    /// from `adduct`. When these disagree with the stored entry, the totals will
    /// not return to their values before the adduct was added.
    fn strip(&mut self, adduct: &Adduct, side: Side) {
        let slot = side as usize;
        let Some(stored) = self.sides[slot].remove(&adduct.formula) else {
            return;
        };
        let amount = stored.amount;
        let mult = side.multiplier();
        let charge = amount.wrapping_mul(adduct.charge).wrapping_mul(mult);
        self.net_charge = self.net_charge.wrapping_sub(charge);
        self.mass -= amount as f64 * adduct.single_mass * mult as f64;
        self.positive_charges = self.positive_charges.wrapping_sub(charge.max(0));
        self.negative_charges = self.negative_charges.wrapping_add(charge.min(0));
        self.log_p -= amount.unsigned_abs() as f64 * adduct.log_prob;
        self.rt_shift -= amount as f64 * adduct.rt_shift * mult as f64;
    }

    /// Create a copy of this compomer with every instance of `adduct` removed
    /// from both sides, `Left` first.
    pub fn remove_adduct(&self, adduct: &Adduct) -> Compomer {
        let mut dup = self.clone();
        dup.strip(adduct, Side::Left);
        dup.strip(adduct, Side::Right);
        dup
    }

    /// Create a copy of this compomer with every instance of `adduct` removed
    /// from `side`. The copy is unchanged if the side has no such adduct.
    pub fn remove_adduct_from(
        &self,
        adduct: &Adduct,
        side: Side,
    ) -> Result<Compomer, CompomerError> {
        side.index("Compomer::remove_adduct_from")?;
        let mut dup = self.clone();
        dup.strip(adduct, side);
        Ok(dup)
    }

    /// Check whether `side_self` of this compomer and `side_other` of `other`
    /// cannot both describe the same feature.
    ///
    /// The sides are compatible only when they hold exactly the same formulae
    /// with the same amounts.
    pub fn is_conflicting(
        &self,
        other: &Compomer,
        side_self: Side,
        side_other: Side,
    ) -> Result<bool, CompomerError> {
        let i = side_self.index("Compomer::is_conflicting")?;
        let j = side_other.index("Compomer::is_conflicting")?;
        Ok(!self.sides[i].same_composition(&other.sides[j]))
    }

    /// Whether `side` holds exactly one adduct species, and it is `adduct`'s
    pub fn is_single_adduct(&self, adduct: &Adduct, side: Side) -> Result<bool, CompomerError> {
        let slot = side.index("Compomer::is_single_adduct")?;
        let component = &self.sides[slot];
        Ok(component.len() == 1 && component.contains(&adduct.formula))
    }

    /// The non-empty labels of the adducts on `side`
    pub fn labels(&self, side: Side) -> Result<Vec<String>, CompomerError> {
        let slot = side.index("Compomer::labels")?;
        Ok(self.sides[slot]
            .iter()
            .filter(|a| !a.label.is_empty())
            .map(|a| a.label.clone())
            .collect())
    }

    /// Render the adducts of `side` as a single formula, each adduct's formula
    /// multiplied by its amount and the elements merged, e.g. `H2Na1`.
    pub fn adducts_as_string(&self, side: Side) -> Result<String, CompomerError> {
        let slot = side.index("Compomer::adducts_as_string")?;
        let total = sum_formulas(
            self.sides[slot]
                .iter()
                .map(|adduct| (adduct.formula.as_str(), adduct.amount)),
        )?;
        Ok(render_composition(&total))
    }

    /// Render both sides as `(left)-(right)`
    pub fn adducts_as_string_both(&self) -> Result<String, CompomerError> {
        Ok(format!(
            "({})-({})",
            self.adducts_as_string(Side::Left)?,
            self.adducts_as_string(Side::Right)?
        ))
    }

    pub fn component(&self, side: Side) -> Result<&CompomerSide, CompomerError> {
        let slot = side.index("Compomer::component")?;
        Ok(&self.sides[slot])
    }

    pub fn components(&self) -> &[CompomerSide; 2] {
        &self.sides
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    #[inline]
    pub fn net_charge(&self) -> i32 {
        self.net_charge
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn positive_charges(&self) -> i32 {
        self.positive_charges
    }

    #[inline]
    pub fn negative_charges(&self) -> i32 {
        self.negative_charges
    }

    #[inline]
    pub fn log_p(&self) -> f64 {
        self.log_p
    }

    #[inline]
    pub fn rt_shift(&self) -> f64 {
        self.rt_shift
    }

    /// Compare with `other` like `==` does, except that floating point totals
    /// need only agree within `delta`.
    pub fn is_close(&self, other: &Compomer, delta: f64) -> bool {
        self.sides == other.sides
            && self.net_charge == other.net_charge
            && self.positive_charges == other.positive_charges
            && self.negative_charges == other.negative_charges
            && isclose(self.mass, other.mass, delta)
            && isclose(self.log_p, other.log_p, delta)
            && isclose(self.rt_shift, other.rt_shift, delta)
    }

    /// Order by net charge ascending, then mass ascending, then log-probability
    /// descending so that the most probable of otherwise tied compomers comes first.
    ///
    /// Compomers that differ only in their adducts compare `Equal` here.
    pub fn total_order(&self, other: &Compomer) -> Ordering {
        self.net_charge
            .cmp(&other.net_charge)
            .then_with(|| self.mass.total_cmp(&other.mass))
            .then_with(|| other.log_p.total_cmp(&self.log_p))
    }

    fn key_cmp(&self, other: &Compomer) -> Option<Ordering> {
        match self.net_charge.cmp(&other.net_charge) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        match self.mass.partial_cmp(&other.mass)? {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        other.log_p.partial_cmp(&self.log_p)
    }
}

impl PartialEq for Compomer {
    fn eq(&self, other: &Self) -> bool {
        self.sides == other.sides
            && self.net_charge == other.net_charge
            && self.mass == other.mass
            && self.positive_charges == other.positive_charges
            && self.negative_charges == other.negative_charges
            && self.log_p == other.log_p
            && self.rt_shift == other.rt_shift
    }
}

/// See [`Compomer::total_order`]. Compomers whose keys tie but which are not
/// equal are incomparable, so neither `<` nor `>` holds between them.
impl PartialOrd for Compomer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.key_cmp(other)? {
            Ordering::Equal => {
                if self == other {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
            ord => Some(ord),
        }
    }
}

impl Display for Compomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Compomer: Da {}; q_net {}; pCharges {}; nCharges {}; logP {}; RT-Shift {}; id {}",
            self.mass,
            self.net_charge,
            self.positive_charges,
            self.negative_charges,
            self.log_p,
            self.rt_shift,
            self.id
        )?;
        for (side, component) in [Side::Left, Side::Right].iter().zip(self.sides.iter()) {
            writeln!(
                f,
                "  {side}: {}",
                component
                    .iter()
                    .map(|a| format!("{}({})", a.formula, a.amount))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}

/// Stable sort of `compomers` by [`Compomer::total_order`]
pub fn sort_compomers(compomers: &mut [Compomer]) {
    compomers.sort_by(|a, b| a.total_order(b));
}

/// Sort `compomers` and drop every compomer equal to one that precedes it
pub fn dedup_compomers(mut compomers: Vec<Compomer>) -> Vec<Compomer> {
    sort_compomers(&mut compomers);
    let mut kept: Vec<Compomer> = Vec::with_capacity(compomers.len());
    let mut tie_start = 0;
    for c in compomers {
        if let Some(last) = kept.last() {
            if last.total_order(&c) != Ordering::Equal {
                tie_start = kept.len();
            }
        }
        if !kept[tie_start..].contains(&c) {
            kept.push(c);
        }
    }
    kept
}
