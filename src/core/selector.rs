// =============================================================================
// SELECTOR — Analyse du langage de sélection de champs
// =============================================================================
//
// Un sélecteur décrit, de façon compacte, les champs à renvoyer :
//
//   orders{id, status, users{username}}
//
// GRAMMAIRE (insensible à la casse : l'entrée est mise en minuscules) :
//
//   liste  := élément ( ',' élément )*
//   élément:= ident                         (feuille)
//           | ident '{' liste '}'           (groupe, liste non vide)
//   ident  := [a-z_]+
//
// Les espaces autour des identifiants et des accolades sont ignorés.
// Un élément vide entre deux virgules (`a,,b`) est ignoré, et un
// élément peut suivre une accolade fermante sans virgule (`a{b}c`).
//
// ALGORITHME (descente récursive, en deux temps) :
//   1. Construire l'arbre explicite (SelectorNode = ident + enfants)
//        - chercher la première virgule du reste ; l'accolade ouvrante
//          n'est prise en compte que si elle précède cette virgule
//        - pas d'accolade → feuille, on consomme jusqu'à la virgule
//        - accolade → trouver l'accolade fermante par comptage de
//          profondeur sur TOUT le reste, puis récursion sur l'intérieur
//   2. Aplatir l'arbre en chemins pointés : chaque feuille donne
//      `ancêtre1.ancêtre2.feuille`. Le résultat est un BTreeSet
//      (dédupliqué, trié lexicographiquement).
//
// EXEMPLE :
//   "eux, nous{moi{m,o,i}, lui{l,u,i{p}}}"
//     → eux, nous.lui.i.p, nous.lui.l, nous.lui.u,
//       nous.moi.i, nous.moi.m, nous.moi.o
//
// La profondeur d'imbrication est bornée (max_depth) : une entrée
// pathologique ne peut pas épuiser la pile.
//
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, warn};

use super::path::FieldPath;
use crate::error::{QueryError, Result};

/// Profondeur d'imbrication maximale par défaut
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Un nœud de l'arbre de sélection.
///
/// Une feuille a une liste d'enfants vide ; un groupe en a au moins un.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorNode {
    pub name: String,
    pub children: Vec<SelectorNode>,
}

impl SelectorNode {
    pub fn leaf(name: &str) -> Self {
        SelectorNode { name: name.to_string(), children: Vec::new() }
    }

    pub fn group(name: &str, children: Vec<SelectorNode>) -> Self {
        SelectorNode { name: name.to_string(), children }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Profondeur d'imbrication sous ce nœud (0 pour une feuille)
    pub fn depth(&self) -> usize {
        self.children.iter().map(|c| c.depth() + 1).max().unwrap_or(0)
    }
}

impl fmt::Display for SelectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.children.is_empty() {
            write!(f, "{{{}}}", join_nodes(&self.children))?;
        }
        Ok(())
    }
}

fn join_nodes(nodes: &[SelectorNode]) -> String {
    nodes.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(",")
}

/// Un sélecteur analysé : la liste des éléments de premier niveau.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub nodes: Vec<SelectorNode>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Selector> {
        Selector::parse_with_depth(input, DEFAULT_MAX_DEPTH)
    }

    pub fn parse_with_depth(input: &str, max_depth: usize) -> Result<Selector> {
        let lowered = input.to_lowercase();
        let parser = Parser { max_depth };
        let nodes = parser.parse_list(&lowered, 0).inspect_err(|e| {
            warn!(selector = input, error = %e, "sélecteur rejeté");
        })?;
        Ok(Selector { nodes })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Aplatit l'arbre en chemins pointés, dédupliqués et triés.
    pub fn paths(&self) -> BTreeSet<FieldPath> {
        let mut out = BTreeSet::new();
        for node in &self.nodes {
            flatten(node, None, &mut out);
        }
        out
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_nodes(&self.nodes))
    }
}

fn flatten(node: &SelectorNode, prefix: Option<&FieldPath>, out: &mut BTreeSet<FieldPath>) {
    let path = match prefix {
        Some(p) => p.child(&node.name),
        None => FieldPath::single(&node.name),
    };
    if node.is_leaf() {
        out.insert(path);
    } else {
        for child in &node.children {
            flatten(child, Some(&path), out);
        }
    }
}

/// Analyse un sélecteur en chemins pointés (profondeur par défaut).
pub fn parse(selector: &str) -> Result<BTreeSet<FieldPath>> {
    parse_with_depth(selector, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_depth(selector: &str, max_depth: usize) -> Result<BTreeSet<FieldPath>> {
    let paths = Selector::parse_with_depth(selector, max_depth)?.paths();
    debug!(
        paths = %paths.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(","),
        "sélecteur analysé"
    );
    Ok(paths)
}

/// Vérifie la forme d'un identifiant : `^[a-z_]+$`
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

fn check_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::invalid_selector(format!(
            "'{}' n'est pas un nom d'attribut valide", name
        )))
    }
}

struct Parser {
    max_depth: usize,
}

impl Parser {
    /// Analyse une liste d'éléments séparés par des virgules.
    fn parse_list(&self, input: &str, depth: usize) -> Result<Vec<SelectorNode>> {
        let mut nodes = Vec::new();
        let mut rest = input;

        loop {
            rest = rest.trim();
            if rest.is_empty() {
                break;
            }

            let comma = rest.find(',');
            let head = comma.map_or(rest, |i| &rest[..i]);

            let Some(open) = head.find('{') else {
                // Feuille : tout jusqu'à la virgule
                let name = head.trim();
                if !name.is_empty() {
                    check_identifier(name)?;
                    nodes.push(SelectorNode::leaf(name));
                }
                match comma {
                    Some(i) => rest = &rest[i + 1..],
                    None => break,
                }
                continue;
            };

            let name = head[..open].trim();
            if name.is_empty() {
                return Err(QueryError::invalid_selector(
                    "identifiant attendu avant '{'",
                ));
            }
            check_identifier(name)?;

            let close = matching_brace(rest, open, name)?;
            let inner = &rest[open + 1..close];
            if inner.trim().is_empty() {
                return Err(QueryError::invalid_selector(format!(
                    "'{}{{}}' est vide, ajoutez des champs entre les accolades", name
                )));
            }
            if depth + 1 > self.max_depth {
                return Err(QueryError::invalid_selector(format!(
                    "imbrication trop profonde sous '{}' (maximum {})", name, self.max_depth
                )));
            }

            let children = self.parse_list(inner, depth + 1)?;
            if children.is_empty() {
                return Err(QueryError::invalid_selector(format!(
                    "'{}{{...}}' ne contient aucun champ", name
                )));
            }
            nodes.push(SelectorNode::group(name, children));

            // Reprendre après l'accolade fermante, en sautant une virgule
            rest = rest[close + 1..].trim_start();
            if let Some(stripped) = rest.strip_prefix(',') {
                rest = stripped;
            }
        }

        Ok(nodes)
    }
}

/// Position de l'accolade fermante qui correspond à celle en `open`.
fn matching_brace(s: &str, open: usize, name: &str) -> Result<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(QueryError::invalid_selector(format!("'{}{{' : '}}' fermante manquante", name)))
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn dotted(selector: &str) -> Vec<String> {
        parse(selector).unwrap().iter().map(|p| p.to_string()).collect()
    }

    fn sorted(items: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_flat_list() {
        assert_eq!(dotted("a,b"), sorted(&["a", "b"]));
        assert_eq!(dotted("them, us,you"), sorted(&["them", "us", "you"]));
    }

    #[test]
    fn test_groups_and_leaves() {
        assert_eq!(
            dotted("foo{f,o}, bar{b,r}, boy"),
            sorted(&["boy", "foo.f", "foo.o", "bar.b", "bar.r"])
        );
    }

    #[test]
    fn test_deep_nesting() {
        assert_eq!(
            dotted("eux, nous{moi{m,o,i}, lui{l,u,i{p}}}"),
            sorted(&["eux", "nous.moi.m", "nous.moi.o", "nous.moi.i",
                     "nous.lui.l", "nous.lui.u", "nous.lui.i.p"])
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(dotted("Foo{Bar}"), vec!["foo.bar"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(dotted("a, a, b{c}, b{c}"), sorted(&["a", "b.c"]));
    }

    #[test]
    fn test_siblings_do_not_inherit_group() {
        assert_eq!(dotted("x{y{z}}, w"), sorted(&["x.y.z", "w"]));
        assert_eq!(dotted("x{y{z}, v}, w"), sorted(&["x.y.z", "x.v", "w"]));
    }

    #[test]
    fn test_leaf_and_group_with_same_name() {
        assert_eq!(dotted("user, user{name}"), sorted(&["user", "user.name"]));
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        assert_eq!(dotted("  foo  {  f ,  o  } ,boy "), sorted(&["foo.f", "foo.o", "boy"]));
    }

    #[test]
    fn test_empty_items_skipped() {
        assert_eq!(dotted("a,,b,"), sorted(&["a", "b"]));
    }

    #[test]
    fn test_sibling_after_brace_without_comma() {
        assert_eq!(dotted("a{b}c"), sorted(&["a.b", "c"]));
    }

    #[test]
    fn test_comma_before_brace_is_leaf() {
        assert_eq!(dotted("a, b{c, d}"), sorted(&["a", "b.c", "b.d"]));
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["foo{}", "foo{   }", "{a}", "foo{a", "1abc", "a1{b}", "fo o", "a}", "a{b}}",
                    "a{b}{c}", "foo{ , }", "é"] {
            let err = parse(bad).unwrap_err();
            assert!(
                matches!(err, QueryError::InvalidSelector { .. }),
                "'{}' aurait dû être rejeté", bad
            );
        }
    }

    #[test]
    fn test_error_names_offending_identifier() {
        let err = parse("id, 1abc").unwrap_err();
        assert!(err.to_string().contains("1abc"));

        let err = parse("foo{a").unwrap_err();
        assert!(err.to_string().contains("'foo{'"), "{}", err);

        // le groupe resté ouvert est l'extérieur
        let err = parse("a{b{c}").unwrap_err();
        assert!(err.to_string().contains("'a{'"), "{}", err);
    }

    #[test]
    fn test_max_depth() {
        assert!(parse_with_depth("a{b{c}}", 2).is_ok());
        let err = parse_with_depth("a{b{c{d}}}", 2).unwrap_err();
        assert!(err.to_string().contains("imbrication"));
        assert!(parse_with_depth("a,b", 0).is_ok());
    }

    #[test]
    fn test_tree_and_display() {
        let s = Selector::parse("orders{ id, users{username} }").unwrap();
        assert_eq!(s.nodes, vec![SelectorNode::group("orders", vec![
            SelectorNode::leaf("id"),
            SelectorNode::group("users", vec![SelectorNode::leaf("username")]),
        ])]);
        assert_eq!(s.to_string(), "orders{id,users{username}}");
        assert_eq!(s.nodes[0].depth(), 2);
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_valid_identifier("user_id"));
        assert!(is_valid_identifier("_"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("User"));
        assert!(!is_valid_identifier("a.b"));
    }
}
