// =============================================================================
// SEED — Schéma et données d'exemple (gestion de commandes)
// =============================================================================
//
//   User ◄── user ── Order ── product ──► Product
//                      │
//                   address
//                      ▼
//                   Address
//
// Chaque FK de Order expose une collection inverse `orders` sur sa cible :
// `users{orders{status}}` liste les commandes d'un utilisateur.
//
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::memory::MemorySource;
use crate::core::instance::{Instance, RowId};
use crate::core::registry::Registry;
use crate::core::schema::Schema;
use crate::core::typeside::{BaseType, Value};
use crate::error::Result;

/// Le schéma de la boutique d'exemple.
pub fn shop_schema() -> Schema {
    let mut s = Schema::new("Shop");

    s.add_node("Order", "orders")
        .add_node("User", "users")
        .add_node("Product", "products")
        .add_node("Address", "addresses");

    s.add_attribute("id", "Order", BaseType::Integer)
        .add_attribute("status", "Order", BaseType::String)
        .add_fk("user", "Order", "User", "user_id", "orders")
        .add_fk("product", "Order", "Product", "product_id", "orders")
        .add_fk("address", "Order", "Address", "address_id", "orders");

    s.add_attribute("id", "User", BaseType::Integer)
        .add_attribute("username", "User", BaseType::String)
        .add_attribute("email", "User", BaseType::String);

    // Les prix sont des chaînes ("999.99"), comme dans la base d'origine
    s.add_attribute("id", "Product", BaseType::Integer)
        .add_attribute("name", "Product", BaseType::String)
        .add_attribute("price", "Product", BaseType::String);

    s.add_attribute("id", "Address", BaseType::Integer)
        .add_attribute("zipcode", "Address", BaseType::String)
        .add_attribute("country", "Address", BaseType::String);

    s
}

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
}

fn fks(pairs: &[(&str, RowId)]) -> HashMap<String, RowId> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Les données d'exemple : 3 utilisateurs, 3 adresses, 5 produits, 5 commandes.
pub fn shop_instance(schema: &Schema) -> Result<Instance> {
    let mut inst = Instance::new("ShopData", schema);

    for (id, username, email) in [
        (1, "john_doe", "john@example.com"),
        (2, "jane_smith", "jane@example.com"),
        (3, "peter_cane", "peter@example.com"),
    ] {
        inst.insert_with_id("User", id, attrs(&[("username", username), ("email", email)]), HashMap::new())?;
    }

    for (id, zipcode, country) in [(1, "12345", "USA"), (2, "54321", "Canada"), (3, "98765", "Japan")] {
        inst.insert_with_id("Address", id, attrs(&[("zipcode", zipcode), ("country", country)]), HashMap::new())?;
    }

    for (id, name, price) in [
        (1, "Laptop", "999.99"),
        (2, "Mouse", "29.99"),
        (3, "Keyboard", "199.99"),
        (4, "Headphones", "99.99"),
        (5, "Phone", "99.99"),
    ] {
        inst.insert_with_id("Product", id, attrs(&[("name", name), ("price", price)]), HashMap::new())?;
    }

    // (id, user, product, address)
    for (id, user, product, address) in [(1, 1, 1, 1), (2, 2, 2, 2), (3, 1, 3, 1), (4, 2, 4, 2), (5, 3, 5, 3)] {
        inst.insert_with_id(
            "Order",
            id,
            attrs(&[("status", "pending")]),
            fks(&[("user", user), ("product", product), ("address", address)]),
        )?;
    }

    Ok(inst)
}

/// Registre validé du schéma d'exemple.
pub fn shop_registry() -> Result<Arc<Registry>> {
    Ok(Arc::new(Registry::new(shop_schema())?))
}

/// Source en mémoire remplie avec les données d'exemple.
pub fn shop_source(registry: Arc<Registry>) -> Result<MemorySource> {
    let instance = shop_instance(registry.schema())?;
    MemorySource::new(registry, instance)
}
