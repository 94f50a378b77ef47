// =============================================================================
// VALIDATE — Vérification de cohérence du schéma et des données
// =============================================================================
//
// Ce module vérifie que les structures sont cohérentes AVANT de servir
// la moindre requête :
//   - Un Schema est bien formé (pas d'arêtes orphelines, pas de champ
//     déclaré deux fois sur une même entité, alias non masquants)
//   - Une Instance respecte le Schema (FK vers des lignes existantes,
//     valeurs conformes aux types déclarés)
//
// Toutes les erreurs sont collectées, pas seulement la première.
//
// =============================================================================

use std::collections::HashSet;

use thiserror::Error;

use super::instance::Instance;
use super::schema::{Edge, Schema};

/// Erreur de validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation : {message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: String) -> Self {
        ValidationError { message }
    }
}

/// Vérifie qu'un Schema est bien formé.
///
/// Conditions :
/// - Toute arête référence des nœuds qui existent
/// - Aucun nom de champ (attribut, FK, colonne FK, collection inverse)
///   n'apparaît deux fois sur une même entité
/// - Les noms de collection des nœuds sont uniques
pub fn validate_schema(schema: &Schema) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for edge in &schema.edges {
        match edge {
            Edge::ForeignKey { name, source, target, .. } => {
                if !schema.nodes.contains_key(source) {
                    errors.push(ValidationError::new(format!(
                        "FK '{}' : le nœud source '{}' n'existe pas", name, source
                    )));
                }
                if !schema.nodes.contains_key(target) {
                    errors.push(ValidationError::new(format!(
                        "FK '{}' : le nœud cible '{}' n'existe pas", name, target
                    )));
                }
            }
            Edge::Attribute { name, source, .. } => {
                if !schema.nodes.contains_key(source) {
                    errors.push(ValidationError::new(format!(
                        "Attribut '{}' : le nœud source '{}' n'existe pas", name, source
                    )));
                }
            }
        }
    }

    let mut names: Vec<&String> = schema.nodes.keys().collect();
    names.sort();

    let mut collections = HashSet::new();
    for node_name in names {
        let node = &schema.nodes[node_name];
        if !collections.insert(node.collection.as_str()) {
            errors.push(ValidationError::new(format!(
                "Collection '{}' déclarée par plusieurs entités", node.collection
            )));
        }

        let mut seen = HashSet::new();
        for field in field_names(schema, node_name) {
            if !seen.insert(field) {
                errors.push(ValidationError::new(format!(
                    "{} : le champ '{}' est déclaré plusieurs fois", node_name, field
                )));
            }
        }

        // Un alias ne doit pas masquer un champ réel de l'entité
        for edge in schema.relations_of(node_name) {
            if let Edge::ForeignKey { name, target, .. } = edge {
                let Some(target_node) = schema.nodes.get(target) else { continue };
                if seen.contains(target_node.collection.as_str()) {
                    errors.push(ValidationError::new(format!(
                        "{} : l'alias '{}' → '{}' masque un champ du même nom",
                        node_name, target_node.collection, name
                    )));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Tous les noms de champs exposés par un nœud.
fn field_names<'a>(schema: &'a Schema, node: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    for edge in &schema.edges {
        match edge {
            Edge::Attribute { name, source, .. } if source == node => out.push(name.as_str()),
            Edge::ForeignKey { name, source, target, column, inverse } => {
                if source == node {
                    out.push(name.as_str());
                    out.push(column.as_str());
                }
                if target == node {
                    out.push(inverse.as_str());
                }
            }
            _ => {}
        }
    }
    out
}

/// Vérifie qu'une Instance respecte le Schema.
///
/// Conditions :
/// - Chaque entité de l'instance existe dans le schéma
/// - Les FK renseignées pointent vers des lignes qui existent
/// - Chaque valeur d'attribut est conforme au type déclaré
pub fn validate_instance(instance: &Instance, schema: &Schema) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut entities: Vec<&String> = instance.data.keys().collect();
    entities.sort();

    for entity_name in entities {
        let entity_data = &instance.data[entity_name];
        if !schema.nodes.contains_key(entity_name) {
            errors.push(ValidationError::new(format!(
                "L'entité '{}' n'existe pas dans le schéma", entity_name
            )));
            continue;
        }

        for row_id in entity_data.row_ids() {
            for edge in &schema.edges {
                match edge {
                    Edge::ForeignKey { name, source, target, .. } if source == entity_name => {
                        let Some(target_row) = entity_data.get_fk(row_id, name) else {
                            // FK nullable : une relation absente est permise
                            continue;
                        };
                        let exists = instance
                            .data
                            .get(target)
                            .is_some_and(|t| t.contains(target_row));
                        if !exists {
                            errors.push(ValidationError::new(format!(
                                "{}[{}] : FK '{}' pointe vers {}[{}] qui n'existe pas",
                                entity_name, row_id, name, target, target_row
                            )));
                        }
                    }
                    Edge::Attribute { name, source, target } if source == entity_name => {
                        if let Some(value) = entity_data.get_attr(row_id, name) {
                            if !value.conforms_to(*target) {
                                errors.push(ValidationError::new(format!(
                                    "{}[{}] : '{}' = {} n'est pas de type {}",
                                    entity_name, row_id, name, value, target
                                )));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::typeside::{BaseType, Value};
    use std::collections::HashMap;

    fn two_node_schema() -> Schema {
        let mut s = Schema::new("Test");
        s.add_node("A", "as")
         .add_node("B", "bs")
         .add_attribute("name", "A", BaseType::String)
         .add_fk("b", "A", "B", "b_id", "as");
        s
    }

    #[test]
    fn test_validate_schema_ok() {
        assert!(validate_schema(&two_node_schema()).is_ok());
    }

    #[test]
    fn test_dangling_fk() {
        let mut s = Schema::new("Test");
        s.add_node("A", "as").add_fk("f", "A", "Z", "f_id", "as");
        let errors = validate_schema(&s).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'Z'"));
    }

    #[test]
    fn test_duplicate_field() {
        let mut s = two_node_schema();
        s.add_attribute("b_id", "A", BaseType::Integer);
        let errors = validate_schema(&s).unwrap_err();
        assert!(errors[0].message.contains("'b_id'"));
    }

    #[test]
    fn test_alias_shadowing_field() {
        let mut s = two_node_schema();
        s.add_attribute("bs", "A", BaseType::String);
        let errors = validate_schema(&s).unwrap_err();
        assert!(errors[0].message.contains("'bs'"));
    }

    #[test]
    fn test_duplicate_collection() {
        let mut s = Schema::new("Test");
        s.add_node("A", "things").add_node("B", "things");
        assert!(validate_schema(&s).is_err());
    }

    #[test]
    fn test_validate_instance_ok() {
        let s = two_node_schema();
        let mut inst = Instance::new("TestData", &s);
        inst.insert_with_id("B", 1, HashMap::new(), HashMap::new()).unwrap();
        inst.insert_with_id("A", 1,
            HashMap::from([("name".into(), Value::from("test"))]),
            HashMap::from([("b".into(), 1)]),
        ).unwrap();
        assert!(validate_instance(&inst, &s).is_ok());
    }

    #[test]
    fn test_validate_instance_broken_fk() {
        let s = two_node_schema();
        let mut inst = Instance::new("TestData", &s);
        // Un A qui pointe vers un B inexistant (row_id 999)
        inst.insert_with_id("A", 1, HashMap::new(), HashMap::from([("b".into(), 999)])).unwrap();
        let errors = validate_instance(&inst, &s).unwrap_err();
        assert!(errors[0].message.contains("B[999]"));
    }

    #[test]
    fn test_validate_instance_wrong_type() {
        let s = two_node_schema();
        let mut inst = Instance::new("TestData", &s);
        inst.insert_with_id("A", 1, HashMap::from([("name".into(), Value::from("x"))]), HashMap::new()).unwrap();
        inst.insert_with_id("A", 2, HashMap::from([("name".into(), Value::Integer(3))]), HashMap::new()).unwrap();
        assert!(validate_instance(&inst, &s).is_err());
    }
}
