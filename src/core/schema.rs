// =============================================================================
// SCHEMA — La structure des entités et de leurs relations
// =============================================================================
//
// Un Schema est un graphe :
//   - Les NŒUDS sont les entités (= tables en SQL)
//   - Les ARÊTES sont de deux types :
//       1. Foreign Keys (FK) : arêtes entre entités (Order → User)
//       2. Attributs : arêtes d'une entité vers un type (Order → String pour status)
//
// Chaque FK induit DEUX champs navigables :
//   - côté source, une relation à un seul élément (`order.user`)
//   - côté cible, une collection inverse (`user.orders`)
// et une colonne scalaire côté source (`order.user_id`).
//
// EXEMPLE VISUEL :
//
//   Order ──user (user_id)──▶ User
//     │   ◀──────orders──────  │
//     │status                  │username
//     ▼                        ▼
//   String                   String
//
// Chaque nœud porte deux noms : son nom singulier (`User`, utilisé
// pour les arêtes) et le nom pluriel de sa collection (`users`, utilisé
// comme nom de table et comme entité racine dans les requêtes).
//
// =============================================================================

use std::collections::HashMap;

use super::typeside::BaseType;

/// Un nœud du schéma = une entité = une table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Nom singulier (`Order`)
    pub name: String,
    /// Nom pluriel de la collection (`orders`)
    pub collection: String,
    /// Champs scalaires dans l'ordre de déclaration (attributs + colonnes FK)
    pub fields: Vec<String>,
}

impl Node {
    pub fn new(name: &str, collection: &str) -> Self {
        Node {
            name: name.to_string(),
            collection: collection.to_string(),
            fields: Vec::new(),
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.collection)
    }
}

/// Une arête dans le schéma.
///
/// - **ForeignKey** : relie deux entités (ex: Order → User).
///   `column` est la colonne scalaire qui stocke la clé, `inverse` le
///   nom de la collection exposée côté cible.
/// - **Attribute** : relie une entité à un type de base (ex: Order → String)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// Clé étrangère : entité source → entité cible
    ForeignKey {
        name: String,
        source: String,
        target: String,
        column: String,
        inverse: String,
    },
    /// Attribut : entité → type de base
    Attribute {
        name: String,
        source: String,
        target: BaseType,
    },
}

impl Edge {
    pub fn name(&self) -> &str {
        match self {
            Edge::ForeignKey { name, .. } => name,
            Edge::Attribute { name, .. } => name,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Edge::ForeignKey { source, .. } => source,
            Edge::Attribute { source, .. } => source,
        }
    }
}

/// Ce que désigne un nom de champ sur une entité donnée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind<'a> {
    /// Attribut scalaire stocké
    Attribute(BaseType),
    /// Colonne scalaire d'une FK (`user_id`), lue comme un entier
    FkColumn { fk: &'a str },
    /// Relation vers un seul enregistrement (`user`)
    Relation { target: &'a str },
    /// Collection inverse d'une FK (`orders` vu depuis `User`)
    Collection { source: &'a str, fk: &'a str },
}

impl FieldKind<'_> {
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldKind::Relation { .. } | FieldKind::Collection { .. })
    }
}

/// Le Schema complet.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Nom du schéma
    pub name: String,
    /// Les nœuds (entités) : nom singulier → Node
    pub nodes: HashMap<String, Node>,
    /// Les arêtes (FK + attributs), dans l'ordre de déclaration
    pub edges: Vec<Edge>,
}

impl Schema {
    /// Crée un nouveau Schema vide
    pub fn new(name: &str) -> Self {
        Schema {
            name: name.to_string(),
            nodes: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Ajoute un nœud (entité/table) au schéma
    pub fn add_node(&mut self, name: &str, collection: &str) -> &mut Self {
        self.nodes.insert(name.to_string(), Node::new(name, collection));
        self
    }

    /// Ajoute un attribut scalaire. Les incohérences (nœud inconnu,
    /// doublon) sont signalées par `validate::validate_schema`.
    pub fn add_attribute(&mut self, name: &str, source: &str, ty: BaseType) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(source) {
            node.fields.push(name.to_string());
        }
        self.edges.push(Edge::Attribute {
            name: name.to_string(),
            source: source.to_string(),
            target: ty,
        });
        self
    }

    /// Ajoute une Foreign Key, sa colonne scalaire et sa collection inverse.
    pub fn add_fk(
        &mut self,
        name: &str,
        source: &str,
        target: &str,
        column: &str,
        inverse: &str,
    ) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(source) {
            node.fields.push(column.to_string());
        }
        self.edges.push(Edge::ForeignKey {
            name: name.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            column: column.to_string(),
            inverse: inverse.to_string(),
        });
        self
    }

    /// L'arête `name` sortant du nœud `source`
    pub fn edge(&self, source: &str, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.source() == source && e.name() == name)
    }

    /// Résout un nom de champ sur une entité.
    pub fn field_kind(&self, node: &str, field: &str) -> Option<FieldKind<'_>> {
        for edge in &self.edges {
            match edge {
                Edge::Attribute { name, source, target } if source == node && name == field => {
                    return Some(FieldKind::Attribute(*target));
                }
                Edge::ForeignKey { name, source, target, column, inverse } => {
                    if source == node && name == field {
                        return Some(FieldKind::Relation { target });
                    }
                    if source == node && column == field {
                        return Some(FieldKind::FkColumn { fk: name });
                    }
                    if target == node && inverse == field {
                        return Some(FieldKind::Collection { source, fk: name });
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Champs scalaires d'un nœud, dans l'ordre de déclaration
    pub fn scalar_fields(&self, node: &str) -> &[String] {
        self.nodes.get(node).map(|n| n.fields.as_slice()).unwrap_or(&[])
    }

    /// Retourne toutes les Foreign Keys du schéma
    pub fn foreign_keys(&self) -> Vec<&Edge> {
        self.edges.iter()
            .filter(|e| matches!(e, Edge::ForeignKey { .. }))
            .collect()
    }

    /// Retourne les FK sortant d'un nœud donné (relations à un élément)
    pub fn relations_of(&self, node_name: &str) -> Vec<&Edge> {
        self.edges.iter()
            .filter(|e| matches!(e, Edge::ForeignKey { source, .. } if source == node_name))
            .collect()
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "schema {} {{", self.name)?;

        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        writeln!(f, "  entities")?;
        for node in nodes {
            writeln!(f, "    {}", node)?;
        }

        let fks = self.foreign_keys();
        if !fks.is_empty() {
            writeln!(f, "  foreign_keys")?;
            for fk in fks {
                if let Edge::ForeignKey { name, source, target, column, inverse } = fk {
                    writeln!(f, "    {} : {} -> {} [{}] (inverse {})", name, source, target, column, inverse)?;
                }
            }
        }

        writeln!(f, "  attributes")?;
        for edge in &self.edges {
            if let Edge::Attribute { name, source, target } = edge {
                writeln!(f, "    {} : {} -> {}", name, source, target)?;
            }
        }

        write!(f, "}}")
    }
}
