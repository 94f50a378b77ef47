// =============================================================================
// INSTANCE — Les données concrètes d'un Schema
// =============================================================================
//
// Si le Schema est le "moule" (CREATE TABLE), l'Instance est le
// "contenu" (les INSERT INTO) :
//   - Pour chaque ENTITÉ, un ensemble de lignes identifiées par un RowId
//   - Pour chaque ligne, les valeurs de ses attributs
//   - Pour chaque FK, la ligne cible (ou rien : FK nullable)
//
// EXEMPLE :
//   Order = { o1, o2 }    User = { u1 }
//   user(o1) = u1, user(o2) = u1
//   status(o1) = "pending"
//
// La collection inverse (`user.orders`) n'est pas stockée : elle se
// déduit en cherchant les lignes dont la FK pointe vers la ligne cible.
//
// Le RowId EST la clé primaire : la colonne `id` d'une entité et la
// colonne FK (`user_id`) contiennent des RowId.
//
// =============================================================================

use std::collections::HashMap;

use super::schema::{Edge, Schema};
use super::typeside::Value;
use crate::error::{QueryError, Result};

/// Identifiant unique d'une ligne dans une table (= clé primaire).
pub type RowId = i64;

/// Les données d'une entité (table) : un ensemble de lignes.
#[derive(Debug, Clone)]
pub struct EntityData {
    /// Les valeurs d'attributs : row_id → (attr_name → Value)
    pub attribute_values: HashMap<RowId, HashMap<String, Value>>,
    /// Les valeurs de FK : row_id → (fk_name → RowId cible)
    pub fk_values: HashMap<RowId, HashMap<String, RowId>>,
}

impl Default for EntityData {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityData {
    pub fn new() -> Self {
        EntityData {
            attribute_values: HashMap::new(),
            fk_values: HashMap::new(),
        }
    }

    /// Insère (ou remplace) la ligne de clé `id`
    pub fn insert_with_id(
        &mut self,
        id: RowId,
        attrs: HashMap<String, Value>,
        fks: HashMap<String, RowId>,
    ) {
        self.attribute_values.insert(id, attrs);
        self.fk_values.insert(id, fks);
    }

    /// Nombre de lignes dans cette entité
    pub fn len(&self) -> usize {
        self.attribute_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_values.is_empty()
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.attribute_values.contains_key(&row_id)
    }

    /// Tous les RowId, par ordre croissant (= ordre d'insertion des clés)
    pub fn row_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.attribute_values.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Lit la valeur d'un attribut pour une ligne donnée
    pub fn get_attr(&self, row_id: RowId, attr_name: &str) -> Option<&Value> {
        self.attribute_values
            .get(&row_id)
            .and_then(|attrs| attrs.get(attr_name))
    }

    /// Lit la cible d'une FK pour une ligne donnée
    pub fn get_fk(&self, row_id: RowId, fk_name: &str) -> Option<RowId> {
        self.fk_values
            .get(&row_id)
            .and_then(|fks| fks.get(fk_name))
            .copied()
    }

    /// Les lignes dont la FK `fk_name` pointe vers `target`, triées
    pub fn rows_pointing_to(&self, fk_name: &str, target: RowId) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.fk_values
            .iter()
            .filter(|(_, fks)| fks.get(fk_name) == Some(&target))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Instance complète : les données de toutes les entités d'un Schema.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Nom de cette instance
    pub name: String,
    /// Nom du schéma associé
    pub schema_name: String,
    /// Données par entité : nom du nœud → EntityData
    pub data: HashMap<String, EntityData>,
}

impl Instance {
    /// Crée une instance vide pour un schéma donné
    pub fn new(name: &str, schema: &Schema) -> Self {
        let data = schema.nodes.keys()
            .map(|node_name| (node_name.clone(), EntityData::new()))
            .collect();
        Instance {
            name: name.to_string(),
            schema_name: schema.name.clone(),
            data,
        }
    }

    fn entity_mut(&mut self, entity: &str) -> Result<&mut EntityData> {
        self.data
            .get_mut(entity)
            .ok_or_else(|| QueryError::unknown_entity(entity))
    }

    /// Insère une ligne avec une clé primaire imposée.
    /// La colonne `id` est renseignée avec cette clé.
    pub fn insert_with_id(
        &mut self,
        entity: &str,
        id: RowId,
        mut attrs: HashMap<String, Value>,
        fks: HashMap<String, RowId>,
    ) -> Result<()> {
        attrs.insert("id".to_string(), Value::Integer(id));
        self.entity_mut(entity)?.insert_with_id(id, attrs, fks);
        Ok(())
    }

    /// Nombre total de lignes dans toutes les entités
    pub fn total_rows(&self) -> usize {
        self.data.values().map(|ed| ed.len()).sum()
    }

    /// Affiche l'instance de manière lisible (pour le debug)
    pub fn display(&self, schema: &Schema) -> String {
        let mut out = format!("instance {} : {} = {{\n", self.name, self.schema_name);

        let mut entities: Vec<&String> = self.data.keys().collect();
        entities.sort();

        for entity_name in entities {
            let entity_data = &self.data[entity_name];
            if entity_data.is_empty() {
                continue;
            }
            out.push_str(&format!("  {} ({} lignes):\n", entity_name, entity_data.len()));

            for row_id in entity_data.row_ids() {
                out.push_str(&format!("    [{}]", row_id));

                for field in schema.scalar_fields(entity_name) {
                    if let Some(value) = entity_data.get_attr(row_id, field) {
                        out.push_str(&format!(" {}: {},", field, value));
                    }
                }

                for edge in schema.relations_of(entity_name) {
                    if let Edge::ForeignKey { name, target, .. } = edge {
                        if let Some(target_id) = entity_data.get_fk(row_id, name) {
                            out.push_str(&format!(" {} -> {}[{}],", name, target, target_id));
                        }
                    }
                }

                out.push('\n');
            }
        }

        out.push_str("}\n");
        out
    }
}
