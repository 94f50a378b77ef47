// =============================================================================
// PATH — Un chemin de champs pointé (`users.username`)
// =============================================================================
//
// Un FieldPath est une séquence NON VIDE de segments, chacun étant un
// identifiant `^[a-z_]+$`. Il désigne un attribut demandé, éventuellement
// à travers des relations imbriquées :
//
//   status              → attribut scalaire de l'entité racine
//   user.username       → attribut de l'entité liée par la relation `user`
//   user.orders.status  → chaîne de deux relations puis un attribut
//
// En SQL, un chemin de longueur N traverse N-1 JOINs.
//
// ORDRE : l'ordre dérivé (segment par segment) coïncide avec l'ordre
// lexicographique de la forme pointée, car '.' est inférieur à tous les
// caractères autorisés dans un segment.
//
// =============================================================================

use std::fmt;

/// Un chemin pointé vers un attribut.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Construit un chemin. Retourne None si la liste de segments est vide.
    pub fn new<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(FieldPath { segments })
        }
    }

    /// Chemin à un seul segment
    pub fn single(segment: &str) -> Self {
        FieldPath { segments: vec![segment.to_string()] }
    }

    /// Découpe une forme pointée (`a.b.c`). Les segments vides sont ignorés.
    pub fn parse_dotted(dotted: &str) -> Option<Self> {
        FieldPath::new(dotted.split('.').filter(|s| !s.is_empty()))
    }

    /// Prolonge le chemin d'un segment : `a.b` + `c` = `a.b.c`
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        FieldPath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// Nombre de segments (toujours ≥ 1)
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Le chemin traverse-t-il au moins une relation ?
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
