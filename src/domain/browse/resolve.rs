//! Variant Resolver
//!
//! Maps a selection onto the variant it denotes, if any. Resolution is
//! total: partial selections, unknown keys, and combinations no variant
//! carries all degrade to "no variant" rather than erroring, and the
//! projector then falls back to the cheapest price.

use super::index::SpecificationIndex;
use super::Selection;
use crate::domain::aggregates::Variant;

#[derive(Clone, Debug)]
pub struct Resolution<'a> {
    /// The exact variant the selection denotes, when it denotes one.
    pub variant: Option<&'a Variant>,
    /// Whether every axis in the index carries a chosen value the axis
    /// actually offers. Vacuously true for an empty index.
    pub fully_selected: bool,
}

/// Resolves a selection against a variant list.
///
/// Only a full selection can resolve: every index axis must carry a chosen
/// value the axis actually offers, and the variant must agree on every one
/// of them. Keys the index does not know are never consulted, and a chosen
/// value the axis never offered counts as nothing chosen, so a stale
/// selection carried over from another listing cannot influence the
/// outcome. When several variants carry the same combination, the first in
/// list order wins.
pub fn resolve<'a>(
    variants: &'a [Variant],
    index: &SpecificationIndex,
    selection: &Selection,
) -> Resolution<'a> {
    let fully_selected = index.axes().iter().all(|axis| {
        selection
            .get(&axis.name)
            .is_some_and(|value| axis.values.iter().any(|v| v == value))
    });

    let variant = if fully_selected {
        variants.iter().find(|v| {
            index.axes().iter().all(|axis| {
                v.specifications.get(&axis.name).map(String::as_str) == selection.get(&axis.name)
            })
        })
    } else {
        None
    };

    Resolution { variant, fully_selected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Money;
    use rust_decimal::Decimal;

    fn variant(id: &str, specs: &[(&str, &str)], price: i64) -> Variant {
        Variant {
            id: id.into(),
            specifications: specs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            price: Money::twd(Decimal::new(price, 0)),
            sku: None,
            image: None,
            images: vec![],
        }
    }

    fn wardrobe() -> Vec<Variant> {
        vec![
            variant("v1", &[("Color", "Red"), ("Size", "M")], 100),
            variant("v2", &[("Color", "Red"), ("Size", "L")], 120),
            variant("v3", &[("Color", "Blue"), ("Size", "M")], 110),
        ]
    }

    #[test]
    fn test_partial_selection_never_resolves() {
        let variants = wardrobe();
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Red");
        let r = resolve(&variants, &index, &selection);
        assert!(!r.fully_selected);
        assert!(r.variant.is_none());
    }

    #[test]
    fn test_full_selection_resolves_exact_variant() {
        let variants = wardrobe();
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Red");
        selection.toggle("Size", "M");
        let r = resolve(&variants, &index, &selection);
        assert!(r.fully_selected);
        assert_eq!(r.variant.map(|v| v.id.as_str()), Some("v1"));
    }

    #[test]
    fn test_full_selection_without_matching_variant_resolves_none() {
        let variants = wardrobe();
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Blue");
        selection.toggle("Size", "L");
        let r = resolve(&variants, &index, &selection);
        assert!(r.fully_selected);
        assert!(r.variant.is_none());
    }

    #[test]
    fn test_unknown_selection_keys_are_ignored() {
        let variants = wardrobe();
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Red");
        selection.toggle("Size", "M");
        selection.toggle("Finish", "Matte");
        let r = resolve(&variants, &index, &selection);
        assert_eq!(r.variant.map(|v| v.id.as_str()), Some("v1"));
    }

    #[test]
    fn test_value_the_axis_never_offered_counts_as_unchosen() {
        let variants = wardrobe();
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Green");
        selection.toggle("Size", "M");
        let r = resolve(&variants, &index, &selection);
        assert!(!r.fully_selected);
        assert!(r.variant.is_none());
    }

    #[test]
    fn test_first_match_wins_on_duplicate_combinations() {
        let variants = vec![
            variant("first", &[("Color", "Red")], 100),
            variant("second", &[("Color", "Red")], 90),
        ];
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Red");
        let r = resolve(&variants, &index, &selection);
        assert_eq!(r.variant.map(|v| v.id.as_str()), Some("first"));
    }

    #[test]
    fn test_variant_missing_an_axis_fails_to_match() {
        let variants = vec![
            variant("partial", &[("Color", "Red")], 100),
            variant("complete", &[("Color", "Red"), ("Size", "M")], 120),
        ];
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Red");
        selection.toggle("Size", "M");
        let r = resolve(&variants, &index, &selection);
        assert_eq!(r.variant.map(|v| v.id.as_str()), Some("complete"));
    }

    #[test]
    fn test_specless_variants_resolve_to_first() {
        let variants = vec![variant("v1", &[], 100), variant("v2", &[], 90)];
        let index = SpecificationIndex::from_variants(&variants);
        let r = resolve(&variants, &index, &Selection::new());
        assert!(r.fully_selected);
        assert_eq!(r.variant.map(|v| v.id.as_str()), Some("v1"));
    }

    #[test]
    fn test_toggle_off_degrades_back_to_unresolved() {
        let variants = wardrobe();
        let index = SpecificationIndex::from_variants(&variants);
        let mut selection = Selection::new();
        selection.toggle("Color", "Red");
        selection.toggle("Size", "M");
        assert!(resolve(&variants, &index, &selection).variant.is_some());
        selection.toggle("Size", "M");
        let r = resolve(&variants, &index, &selection);
        assert!(!r.fully_selected);
        assert!(r.variant.is_none());
    }
}
