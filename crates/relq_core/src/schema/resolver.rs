//! Convention-based shape resolution with a process-wide descriptor cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use relq_driver::ScalarKind;

use crate::error::{CoreError, CoreResult};
use crate::schema::descriptor::{EntityDescriptor, NavigationLink};
use crate::schema::shape::{Entity, EntityShape};

type DescriptorCache = RwLock<HashMap<TypeId, Arc<EntityDescriptor>>>;

fn cache() -> &'static DescriptorCache {
    static CACHE: OnceLock<DescriptorCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolves the descriptor for `T`, building and caching it on first use.
///
/// Resolution failures are not cached; a faulty shape reports its schema
/// error on every call.
///
/// # Errors
///
/// Returns `CoreError::Schema` if the shape declares duplicate columns or
/// no primary key can be located.
pub fn descriptor<T: Entity>() -> CoreResult<Arc<EntityDescriptor>> {
    let id = TypeId::of::<T>();
    if let Some(found) = cache().read().get(&id) {
        return Ok(Arc::clone(found));
    }

    let built = Arc::new(build(T::shape())?);
    let mut map = cache().write();
    let entry = map.entry(id).or_insert(built);
    Ok(Arc::clone(entry))
}

fn build(shape: EntityShape) -> CoreResult<EntityDescriptor> {
    let type_name = shape.type_name;

    for (i, field) in shape.fields.iter().enumerate() {
        if shape.fields[..i]
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case(field.name))
        {
            return Err(CoreError::schema(
                type_name,
                format!("duplicate column {}", field.name),
            ));
        }
    }

    let mut key: Vec<usize> = shape
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.key)
        .map(|(i, _)| i)
        .collect();
    if key.is_empty() {
        if let Some(i) = shape
            .fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case("id"))
        {
            key.push(i);
        } else {
            return Err(CoreError::schema(
                type_name,
                "no primary key: mark a key field or add an id column",
            ));
        }
    }

    let identity = key.len() == 1 && {
        let field = &shape.fields[key[0]];
        field.kind == ScalarKind::Integer && !field.assigned
    };

    let navigations = shape
        .navigations
        .iter()
        .map(|nav| {
            let convention;
            let wanted = match nav.foreign_key {
                Some(declared) => declared,
                None => {
                    convention = format!("{}_id", nav.name.to_lowercase());
                    convention.as_str()
                }
            };
            let resolved = shape
                .fields
                .iter()
                .find(|f| f.name.eq_ignore_ascii_case(wanted))
                .map(|f| f.name);
            NavigationLink::new(nav.name, resolved, nav.target)
        })
        .collect();

    let table = shape.table.unwrap_or(type_name);
    Ok(EntityDescriptor::new(
        type_name,
        table,
        shape.fields,
        key,
        identity,
        navigations,
    ))
}
