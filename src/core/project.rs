// =============================================================================
// PROJECT — Assemblage des objets imbriqués, enregistrement par enregistrement
// =============================================================================
//
// Pour chaque enregistrement racine, on part d'un objet vide et on
// parcourt chaque chemin segment par segment :
//
//   chemin user.username, enregistrement o1 :
//     o1.user      → relation vers u1   → out["user"] = {} puis on descend
//     u1.username  → "john_doe"         → out["user"]["username"] = "john_doe"
//
// RÈGLES :
//   - dernier segment : on écrit la valeur du champ
//       scalaire            → la valeur
//       relation            → la projection par défaut de l'enregistrement lié
//       relation nulle      → null
//       collection          → tableau des projections par défaut
//   - segment intermédiaire :
//       relation renseignée → objet imbriqué (créé ou réutilisé), on descend
//       collection          → tableau d'objets imbriqués, un par élément
//       relation nulle      → on abandonne ce chemin, RIEN n'est écrit
//       scalaire            → on abandonne (un scalaire ne se traverse pas)
//   - champ que l'enregistrement ne déclare pas (`has_attribute` faux), à
//     n'importe quel niveau : abandon silencieux.
//
// Une demande partielle se dégrade donc en omission, jamais en erreur.
// L'ordre des enregistrements est celui du chargement.
//
// =============================================================================

use std::collections::BTreeSet;

use serde_json::{Map, Value as Json};
use tracing::trace;

use super::path::FieldPath;
use super::record::{Field, Record};

/// Projette chaque enregistrement selon les chemins demandés.
pub fn project<R: Record>(records: &[R], paths: &BTreeSet<FieldPath>) -> Vec<Map<String, Json>> {
    records
        .iter()
        .map(|record| project_one(record, paths))
        .collect()
}

/// Projette un seul enregistrement.
pub fn project_one<R: Record>(record: &R, paths: &BTreeSet<FieldPath>) -> Map<String, Json> {
    let mut out = Map::new();
    for path in paths {
        walk(record, path.segments(), &mut out);
    }
    out
}

fn walk<R: Record>(record: &R, segments: &[String], out: &mut Map<String, Json>) {
    let Some((head, tail)) = segments.split_first() else {
        return;
    };
    if !record.has_attribute(head) {
        trace!(entity = record.entity(), field = %head, "champ absent, chemin abandonné");
        return;
    }
    let Some(field) = record.get_attribute(head) else {
        return;
    };

    if tail.is_empty() {
        out.insert(head.clone(), leaf_value(field));
        return;
    }

    match field {
        Field::One(Some(related)) => {
            let entry = out
                .entry(head.clone())
                .or_insert_with(|| Json::Object(Map::new()));
            if let Json::Object(nested) = entry {
                walk(&related, tail, nested);
            }
        }
        Field::Many(items) => {
            let entry = out
                .entry(head.clone())
                .or_insert_with(|| Json::Array(vec![Json::Object(Map::new()); items.len()]));
            if let Json::Array(slots) = entry {
                for (item, slot) in items.iter().zip(slots.iter_mut()) {
                    if let Json::Object(nested) = slot {
                        walk(item, tail, nested);
                    }
                }
            }
        }
        Field::One(None) | Field::Scalar(_) => {}
    }
}

fn leaf_value<R: Record>(field: Field<R>) -> Json {
    match field {
        Field::Scalar(value) => value.to_json(),
        Field::One(Some(related)) => Json::Object(related.default_projection()),
        Field::One(None) => Json::Null,
        Field::Many(items) => Json::Array(
            items.iter().map(|r| Json::Object(r.default_projection())).collect(),
        ),
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::typeside::Value;
    use serde_json::json;

    /// Enregistrement minimal en mémoire pour tester le parcours seul.
    #[derive(Debug, Clone)]
    struct Fake {
        fields: Vec<String>,
        scalars: Vec<(&'static str, Value)>,
        one: Vec<(&'static str, Option<Fake>)>,
        many: Vec<(&'static str, Vec<Fake>)>,
        /// Champs que l'entité ne déclare pas, même si une valeur existe
        hidden: Vec<&'static str>,
    }

    impl Fake {
        fn new(scalars: Vec<(&'static str, Value)>) -> Self {
            Fake {
                fields: scalars.iter().map(|(k, _)| k.to_string()).collect(),
                scalars,
                one: Vec::new(),
                many: Vec::new(),
                hidden: Vec::new(),
            }
        }
    }

    impl Record for Fake {
        fn entity(&self) -> &str {
            "Fake"
        }

        fn scalar_fields(&self) -> &[String] {
            &self.fields
        }

        fn has_attribute(&self, name: &str) -> bool {
            !self.hidden.iter().any(|h| *h == name) && self.get_attribute(name).is_some()
        }

        fn get_attribute(&self, name: &str) -> Option<Field<Self>> {
            if let Some((_, v)) = self.scalars.iter().find(|(k, _)| *k == name) {
                return Some(Field::Scalar(v.clone()));
            }
            if let Some((_, r)) = self.one.iter().find(|(k, _)| *k == name) {
                return Some(Field::One(r.clone()));
            }
            self.many.iter().find(|(k, _)| *k == name).map(|(_, rs)| Field::Many(rs.clone()))
        }
    }

    fn paths(items: &[&str]) -> BTreeSet<FieldPath> {
        items.iter().filter_map(|p| FieldPath::parse_dotted(p)).collect()
    }

    fn order(user: Option<Fake>) -> Fake {
        let mut o = Fake::new(vec![("id", Value::from(1)), ("status", Value::from("pending"))]);
        o.one.push(("user", user));
        o
    }

    fn user() -> Fake {
        Fake::new(vec![("id", Value::from(7)), ("username", Value::from("john_doe"))])
    }

    #[test]
    fn test_scalars_and_nested() {
        let out = project_one(&order(Some(user())), &paths(&["id", "user.username"]));
        assert_eq!(Json::Object(out), json!({"id": 1, "user": {"username": "john_doe"}}));
    }

    #[test]
    fn test_absent_relation_is_omitted_not_null() {
        let out = project_one(&order(None), &paths(&["id", "user.username"]));
        assert_eq!(Json::Object(out), json!({"id": 1}));
    }

    #[test]
    fn test_unknown_fields_are_omitted() {
        let out = project_one(&order(Some(user())), &paths(&["ghost", "user.ghost", "ghost.x", "status"]));
        assert_eq!(Json::Object(out), json!({"status": "pending", "user": {}}));
    }

    #[test]
    fn test_undeclared_field_is_omitted() {
        let mut o = order(Some(user()));
        o.hidden.push("status");
        let out = project_one(&o, &paths(&["id", "status"]));
        assert_eq!(Json::Object(out), json!({"id": 1}));
    }

    #[test]
    fn test_scalar_is_not_traversed() {
        let out = project_one(&order(Some(user())), &paths(&["status.length"]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_bare_relation_leaf() {
        let out = project_one(&order(Some(user())), &paths(&["user"]));
        assert_eq!(Json::Object(out), json!({"user": {"id": 7, "username": "john_doe"}}));

        let out = project_one(&order(None), &paths(&["user"]));
        assert_eq!(Json::Object(out), json!({"user": null}));
    }

    #[test]
    fn test_bare_relation_merges_with_nested() {
        let out = project_one(&order(Some(user())), &paths(&["user", "user.username"]));
        assert_eq!(Json::Object(out), json!({"user": {"id": 7, "username": "john_doe"}}));
    }

    #[test]
    fn test_collection_intermediate() {
        let mut u = user();
        u.many.push(("orders", vec![order(None), order(None)]));
        let out = project_one(&u, &paths(&["orders.id", "orders.status", "username"]));
        assert_eq!(Json::Object(out), json!({
            "orders": [{"id": 1, "status": "pending"}, {"id": 1, "status": "pending"}],
            "username": "john_doe",
        }));
    }

    #[test]
    fn test_collection_leaf() {
        let mut u = user();
        u.many.push(("orders", vec![order(None)]));
        let out = project_one(&u, &paths(&["orders"]));
        assert_eq!(Json::Object(out), json!({"orders": [{"id": 1, "status": "pending"}]}));
    }

    #[test]
    fn test_preserves_record_order() {
        let a = Fake::new(vec![("id", Value::from(2))]);
        let b = Fake::new(vec![("id", Value::from(1))]);
        let out = project(&[a, b], &paths(&["id"]));
        assert_eq!(out[0]["id"], json!(2));
        assert_eq!(out[1]["id"], json!(1));
    }
}
