// =============================================================================
// RECORD — Capacité uniforme "lire un champ nommé"
// =============================================================================
//
// Le projecteur parcourt des enregistrements SANS connaître leur type
// concret. Chaque enregistrement expose :
//   has_attribute(nom)  → le champ existe-t-il sur cette entité ?
//   get_attribute(nom)  → sa valeur, étiquetée :
//       Scalar(v)    valeur de cellule
//       One(Some(r)) relation vers un autre enregistrement
//       One(None)    relation non renseignée (FK nulle)
//       Many(rs)     collection inverse
//     ou None si le champ n'existe pas.
//
// C'est le collaborateur d'accès aux données (backend) qui implémente
// ce trait : il décide si une relation est déjà chargée ou s'il faut
// aller la chercher à la demande.
//
// =============================================================================

use serde_json::{Map, Value as Json};

use super::typeside::Value;

/// La valeur étiquetée d'un champ.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<R> {
    Scalar(Value),
    One(Option<R>),
    Many(Vec<R>),
}

/// Un enregistrement opaque fourni par le collaborateur d'accès aux données.
pub trait Record: Sized {
    /// Nom du nœud de schéma de cet enregistrement
    fn entity(&self) -> &str;

    /// Champs scalaires exposés, dans l'ordre de déclaration
    fn scalar_fields(&self) -> &[String];

    fn has_attribute(&self, name: &str) -> bool;

    fn get_attribute(&self, name: &str) -> Option<Field<Self>>;

    /// Projection par défaut : tous les champs scalaires.
    fn default_projection(&self) -> Map<String, Json> {
        let mut out = Map::new();
        for name in self.scalar_fields() {
            if let Some(Field::Scalar(value)) = self.get_attribute(name) {
                out.insert(name.clone(), value.to_json());
            }
        }
        out
    }
}
