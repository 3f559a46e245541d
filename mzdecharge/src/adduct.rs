/*! Chemical adducts that explain mass and charge differences between features */
use std::fmt::Display;
use std::ops::{AddAssign, Mul};

use chemical_elements::PROTON as _PROTON;

/// The mass of H+, a hydrogen atom minus an electron
pub const PROTON: f64 = _PROTON;

/// A charged or neutral chemical species that may be attached to an analyte
/// some number of times.
///
/// An adduct is keyed by its `formula`, which must not carry an explicit
/// charge marker. The charge is tracked separately in `charge`.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Adduct {
    /// The charge of a single unit of this species
    pub charge: i32,
    /// The stoichiometric multiplicity of this species
    pub amount: i32,
    /// The mass of a single unit of this species
    pub single_mass: f64,
    /// The log-probability of observing a single unit of this species
    pub log_prob: f64,
    /// The canonical formula of the species, used as its identity
    pub formula: String,
    /// The expected retention time shift caused by a single unit
    pub rt_shift: f64,
    /// An optional tag propagated to features carrying this adduct, empty
    /// when absent
    pub label: String,
}

impl Adduct {
    pub fn new(
        charge: i32,
        amount: i32,
        single_mass: f64,
        formula: impl Into<String>,
        log_prob: f64,
        rt_shift: f64,
    ) -> Self {
        Self {
            charge,
            amount,
            single_mass,
            log_prob,
            formula: formula.into(),
            rt_shift,
            label: String::new(),
        }
    }

    /// Attach a label to this adduct
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// A single proton, the default charge carrier in positive mode
    pub fn proton() -> Self {
        Self::new(1, 1, PROTON, "H1", 0.0, 0.0)
    }

    /// A single proton loss, the default charge carrier in negative mode
    pub fn deprotonation() -> Self {
        Self::new(-1, 1, -PROTON, "H-1", 0.0, 0.0)
    }

    #[inline]
    pub fn charge(&self) -> i32 {
        self.charge
    }

    #[inline]
    pub fn amount(&self) -> i32 {
        self.amount
    }

    #[inline]
    pub fn single_mass(&self) -> f64 {
        self.single_mass
    }

    #[inline]
    pub fn log_prob(&self) -> f64 {
        self.log_prob
    }

    #[inline]
    pub fn formula(&self) -> &str {
        &self.formula
    }

    #[inline]
    pub fn rt_shift(&self) -> f64 {
        self.rt_shift
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_amount(&mut self, amount: i32) {
        self.amount = amount;
    }

    /// Whether `other` describes the same species with the same per-unit constants,
    /// ignoring the amount.
    pub fn same_species(&self, other: &Adduct) -> bool {
        self.formula == other.formula
            && self.charge == other.charge
            && self.single_mass == other.single_mass
            && self.log_prob == other.log_prob
    }
}

impl AddAssign<&Adduct> for Adduct {
    fn add_assign(&mut self, rhs: &Adduct) {
        if self.formula != rhs.formula {
            tracing::warn!(
                "Refusing to merge adduct {} into adduct {}",
                rhs.formula,
                self.formula
            );
            return;
        }
        self.amount = self.amount.wrapping_add(rhs.amount);
    }
}

impl AddAssign<Adduct> for Adduct {
    fn add_assign(&mut self, rhs: Adduct) {
        *self += &rhs;
    }
}

impl Mul<i32> for Adduct {
    type Output = Adduct;

    fn mul(mut self, rhs: i32) -> Self::Output {
        self.amount = self.amount.wrapping_mul(rhs);
        self
    }
}

impl Mul<i32> for &Adduct {
    type Output = Adduct;

    fn mul(self, rhs: i32) -> Self::Output {
        self.clone() * rhs
    }
}

impl Display for Adduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) q={} m={} logP={}",
            self.formula, self.amount, self.charge, self.single_mass, self.log_prob
        )?;
        if self.rt_shift != 0.0 {
            write!(f, " rt_shift={}", self.rt_shift)?;
        }
        if !self.label.is_empty() {
            write!(f, " label={}", self.label)?;
        }
        Ok(())
    }
}
