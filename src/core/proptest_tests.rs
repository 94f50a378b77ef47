//! Tests de propriétés du parseur de sélecteurs.
//!
//! Des arbres de sélection arbitraires sont rendus en texte puis
//! réanalysés.

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::path::FieldPath;
use super::selector::{parse, Selector, SelectorNode};

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

fn arb_node() -> impl Strategy<Value = SelectorNode> {
    let leaf = arb_name().prop_map(|name| SelectorNode::leaf(&name));
    leaf.prop_recursive(
        4,  // profondeur
        48, // taille
        4,  // enfants par groupe
        |inner| {
            (arb_name(), prop::collection::vec(inner, 1..4))
                .prop_map(|(name, children)| SelectorNode::group(&name, children))
        },
    )
}

fn arb_selector() -> impl Strategy<Value = Selector> {
    prop::collection::vec(arb_node(), 1..5).prop_map(|nodes| Selector { nodes })
}

/// `a.b.c` → `a{b{c}}`
fn path_to_selector(path: &FieldPath) -> String {
    let segments = path.segments();
    let mut out = segments.join("{");
    out.push_str(&"}".repeat(segments.len() - 1));
    out
}

fn reparse(paths: &BTreeSet<FieldPath>) -> BTreeSet<FieldPath> {
    let text = paths.iter().map(path_to_selector).collect::<Vec<_>>().join(",");
    parse(&text).unwrap_or_default()
}

proptest! {
    #[test]
    fn rendered_tree_parses_back(selector in arb_selector()) {
        let text = selector.to_string();
        let parsed = Selector::parse(&text);
        prop_assert!(parsed.is_ok(), "{} : {:?}", text, parsed);
        if let Ok(parsed) = parsed {
            prop_assert_eq!(parsed, selector);
        }
    }

    #[test]
    fn flattening_matches_tree(selector in arb_selector()) {
        let paths = parse(&selector.to_string()).unwrap_or_default();
        prop_assert_eq!(paths, selector.paths());
    }

    #[test]
    fn parse_is_idempotent(selector in arb_selector()) {
        let once = parse(&selector.to_string()).unwrap_or_default();
        prop_assert!(!once.is_empty());
        prop_assert_eq!(reparse(&once), once);
    }

    #[test]
    fn case_and_spacing_are_insignificant(selector in arb_selector()) {
        let text = selector.to_string();
        let noisy = text.to_uppercase().replace(',', " , ").replace('{', " { ");
        prop_assert_eq!(parse(&noisy).unwrap_or_default(), parse(&text).unwrap_or_default());
    }
}
