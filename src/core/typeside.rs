// =============================================================================
// TYPESIDE — Les types primitifs des attributs
// =============================================================================
//
// Chaque attribut scalaire d'une entité a un BaseType, et chaque cellule
// d'un enregistrement contient une Value. C'est l'équivalent des types
// de colonnes SQL (VARCHAR, INTEGER...), indépendamment de tout backend.
//
// La projection finale est du JSON : une Value sait se convertir en
// serde_json::Value sans perte (sauf NaN/±∞, qui deviennent null).
//
// =============================================================================

use std::fmt;

/// Un type de base pour un attribut scalaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// Chaîne de caractères (→ TEXT en SQL)
    String,
    /// Entier (→ INTEGER en SQL)
    Integer,
    /// Nombre à virgule flottante (→ REAL / DOUBLE en SQL)
    Float,
    /// Booléen
    Boolean,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::String => write!(f, "String"),
            BaseType::Integer => write!(f, "Int"),
            BaseType::Float => write!(f, "Float"),
            BaseType::Boolean => write!(f, "Bool"),
        }
    }
}

/// Une valeur concrète : le contenu d'une cellule.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl Value {
    /// Retourne le BaseType de cette valeur (None pour Null, qui est polymorphe)
    pub fn get_type(&self) -> Option<BaseType> {
        match self {
            Value::String(_) => Some(BaseType::String),
            Value::Integer(_) => Some(BaseType::Integer),
            Value::Float(_) => Some(BaseType::Float),
            Value::Boolean(_) => Some(BaseType::Boolean),
            Value::Null => None,
        }
    }

    /// La valeur est-elle compatible avec le type déclaré ? Null l'est toujours.
    pub fn conforms_to(&self, ty: BaseType) -> bool {
        self.get_type().map_or(true, |t| t == ty)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(fl) => serde_json::Number::from_f64(*fl)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
