//! Scaling of adduct formulae by an integer multiplicity.
//!
//! Formulae are parsed into a [`ChemicalComposition`], so repeated elements
//! are merged, e.g. `H1H1` and `H2` describe the same species. Rendering writes
//! every element with an explicit count in order of its symbol.
use chemical_elements::ChemicalComposition;
use itertools::Itertools;
use thiserror::Error;

/// An error that might occur while rendering an adduct formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("The adduct formula {0:?} contains an explicit charge, which is tracked separately")]
    ExplicitCharge(String),
    #[error("Failed to parse adduct formula {formula:?}: {reason}")]
    Unparsable { formula: String, reason: String },
}

/// Parse `formula` into its elemental composition.
///
/// A `+` anywhere in the formula is rejected, charges belong on the [`Adduct`](crate::Adduct).
pub fn parse_formula(formula: &str) -> Result<ChemicalComposition<'static>, FormulaError> {
    if formula.contains('+') {
        return Err(FormulaError::ExplicitCharge(formula.to_string()));
    }
    if formula.is_empty() {
        return Ok(ChemicalComposition::new());
    }
    formula
        .parse::<ChemicalComposition>()
        .map_err(|e| FormulaError::Unparsable {
            formula: formula.to_string(),
            reason: format!("{e:?}"),
        })
}

/// Multiply every element count in `composition` by `factor`
pub fn scale_composition<'a>(
    composition: &ChemicalComposition<'a>,
    factor: i32,
) -> ChemicalComposition<'a> {
    let mut scaled = ChemicalComposition::new();
    for (elt, count) in composition.iter() {
        scaled.set(*elt, count.wrapping_mul(factor));
    }
    scaled
}

/// Sum each formula multiplied by its factor into a single composition
pub fn sum_formulas<'f>(
    terms: impl IntoIterator<Item = (&'f str, i32)>,
) -> Result<ChemicalComposition<'static>, FormulaError> {
    let mut total = ChemicalComposition::new();
    for (formula, factor) in terms {
        let part = parse_formula(formula)?;
        for (elt, count) in part.iter() {
            let current = total[elt];
            total.set(*elt, current.wrapping_add(count.wrapping_mul(factor)));
        }
    }
    Ok(total)
}

/// Render `composition` with explicit counts, skipping elements that cancel out
pub fn render_composition(composition: &ChemicalComposition<'_>) -> String {
    composition
        .iter()
        .filter(|(_, count)| **count != 0)
        .map(|(elt, count)| (elt.to_string(), *count))
        .sorted()
        .map(|(symbol, count)| format!("{symbol}{count}"))
        .join("")
}

/// Multiply every element count in `formula` by `factor` and render the result
/// with explicit counts, e.g. `scale_formula("H1", 2) == Ok("H2")`.
pub fn scale_formula(formula: &str, factor: i32) -> Result<String, FormulaError> {
    let composition = parse_formula(formula)?;
    Ok(render_composition(&scale_composition(&composition, factor)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scale_simple() {
        assert_eq!(scale_formula("H1", 2).unwrap(), "H2");
        assert_eq!(scale_formula("Na", 1).unwrap(), "Na1");
        assert_eq!(scale_formula("C2H3N1", 3).unwrap(), "C6H9N3");
        assert_eq!(scale_formula("", 4).unwrap(), "");
        assert_eq!(scale_formula("K1", 0).unwrap(), "");
    }

    #[test]
    fn test_scale_negative() {
        assert_eq!(scale_formula("H-1", 2).unwrap(), "H-2");
        assert_eq!(scale_formula("H-1", -1).unwrap(), "H1");
    }

    #[test]
    fn test_repeated_elements_merge() {
        assert_eq!(scale_formula("H1H1", 1).unwrap(), "H2");
        assert_eq!(scale_formula("H1O1", 1).unwrap(), scale_formula("O1H1", 1).unwrap());
        assert_eq!(scale_formula("O1H1", 2).unwrap(), "H2O2");
        assert_eq!(scale_formula("H2H-2", 3).unwrap(), "");

        let composition = parse_formula("NaH1H1").unwrap();
        assert_eq!(render_composition(&composition), "H2Na1");

        let total = sum_formulas([("H1", 2), ("Na1", 1), ("H-1", 1)]).unwrap();
        assert_eq!(render_composition(&total), "H1Na1");
    }

    #[test]
    fn test_rejects_charge() {
        assert_eq!(
            scale_formula("H1+", 1),
            Err(FormulaError::ExplicitCharge("H1+".to_string()))
        );
        assert_eq!(
            parse_formula("Na+").unwrap_err(),
            FormulaError::ExplicitCharge("Na+".to_string())
        );
        assert!(matches!(
            scale_formula("h1", 1),
            Err(FormulaError::Unparsable { .. })
        ));
    }
}
