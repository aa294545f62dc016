use super::model::{Field, FieldType, Schema, SchemaReference, SchemaType};
use crate::config::{ApiConfig, ApiKey};
use crate::error::{ApiConfigError, Result};
use crate::naming::capitalize;
use crate::transformer::{self, ApiSerializationConfig};
use crate::types::{TypeRef, TypeUniverse};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

type SchemaKey = (ApiSerializationConfig, TypeRef);

/// Cache slot. `Building` is the placeholder installed before recursing into
/// a schema's items or properties.
#[derive(Debug)]
enum Slot {
    Building,
    Done(Arc<Schema>),
}

struct BuildContext<'a> {
    universe: &'a TypeUniverse,
    serialization: &'a ApiSerializationConfig,
}

/// Compiles and memoizes schemas, keyed by (serialization rules, type after
/// transformer resolution).
///
/// Not safe for concurrent mutation; use one repository per concurrent build.
#[derive(Debug)]
pub struct SchemaRepository {
    slots: HashMap<SchemaKey, Slot>,
    /// Keys installed during the current `get_or_add`, dropped if it fails.
    installed: Vec<SchemaKey>,
    /// Schemas used by each API (root-insensitive key), by schema name.
    by_api: HashMap<ApiKey, IndexMap<String, Arc<Schema>>>,
    any: Arc<Schema>,
    map: Arc<Schema>,
}

impl Default for SchemaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRepository {
    pub fn new() -> Self {
        SchemaRepository {
            slots: HashMap::new(),
            installed: Vec::new(),
            by_api: HashMap::new(),
            any: Schema::any(),
            map: Schema::map(),
        }
    }

    /// Shared untyped schema.
    pub fn any_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.any)
    }

    /// Shared untyped map schema.
    pub fn map_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.map)
    }

    /// Look up the schema for `ty` without creating it.
    pub fn get(&self, ty: &TypeRef, config: &ApiConfig) -> Result<Option<Arc<Schema>>> {
        let universe = config.universe();
        let resolved = transformer::schema_type(universe, ty, Some(&config.serialization_config))?;
        if TypeUniverse::is_any_object(&resolved) {
            return Ok(Some(self.any_schema()));
        }
        if universe.is_map_type(&resolved) {
            return Ok(Some(self.map_schema()));
        }
        self.lookup(&(config.serialization_config.clone(), resolved))
    }

    /// The schema for `ty`, compiled on first use. Repeated calls with an
    /// equal type and serialization config return the same `Arc`.
    ///
    /// On failure nothing compiled during the call stays cached, including
    /// schemas that finished before the failing one.
    pub fn get_or_add(&mut self, ty: &TypeRef, config: &ApiConfig) -> Result<Arc<Schema>> {
        let ctx = BuildContext {
            universe: config.universe(),
            serialization: &config.serialization_config,
        };
        let resolved = transformer::schema_type(ctx.universe, ty, Some(ctx.serialization))?;
        let key = (ctx.serialization.clone(), resolved);
        self.installed.clear();
        let built = self.ensure(&key, &ctx);
        let installed = std::mem::take(&mut self.installed);
        if let Err(e) = built {
            for stale in &installed {
                self.slots.remove(stale);
            }
            debug!(ty = %ty, discarded = installed.len(), "Discarded partially compiled schemas");
            return Err(e);
        }
        let schema = self.lookup(&key)?.ok_or_else(|| ApiConfigError::RepositoryIntegrity {
            ty: ty.to_string(),
            reason: "schema missing after construction".to_string(),
        })?;
        self.add_schema_to_api(&config.api_key().without_root(), &schema)?;
        Ok(schema)
    }

    /// Dereference a field's schema reference.
    pub fn resolve(&self, reference: &SchemaReference) -> Result<Arc<Schema>> {
        self.lookup(&(reference.serialization.clone(), reference.ty.clone()))?
            .ok_or_else(|| ApiConfigError::RepositoryIntegrity {
                ty: reference.ty.to_string(),
                reason: "dangling schema reference".to_string(),
            })
    }

    /// Every schema used by the API, in the order it was first reached.
    /// The root of `key` is ignored.
    pub fn get_all_schemas(&self, key: &ApiKey) -> Vec<Arc<Schema>> {
        self.by_api
            .get(&key.without_root())
            .map(|schemas| schemas.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lookup(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>> {
        match self.slots.get(key) {
            None => Ok(None),
            Some(Slot::Done(schema)) => Ok(Some(Arc::clone(schema))),
            Some(Slot::Building) => Err(ApiConfigError::RepositoryIntegrity {
                ty: key.1.to_string(),
                reason: "placeholder schema reached a caller".to_string(),
            }),
        }
    }

    /// Index `schema`, and every schema it references, under `api`.
    fn add_schema_to_api(&mut self, api: &ApiKey, schema: &Arc<Schema>) -> Result<()> {
        let mut pending = vec![Arc::clone(schema)];
        let mut seen = HashSet::new();
        while let Some(next) = pending.pop() {
            if next.is_any() || !seen.insert(next.name.clone()) {
                continue;
            }
            for field in next.fields.values() {
                let mut current = Some(field);
                while let Some(f) = current {
                    if let Some(reference) = &f.schema_reference {
                        pending.push(self.resolve(reference)?);
                    }
                    current = f.array_item.as_deref();
                }
            }
            self.by_api
                .entry(api.clone())
                .or_default()
                .entry(next.name.clone())
                .or_insert(next);
        }
        Ok(())
    }

    fn install(&mut self, key: &SchemaKey, slot: Slot) {
        if self.slots.insert(key.clone(), slot).is_none() {
            self.installed.push(key.clone());
        }
    }

    /// Make sure `key` holds a schema (or is being built further up the stack).
    fn ensure(&mut self, key: &SchemaKey, ctx: &BuildContext<'_>) -> Result<()> {
        if self.slots.contains_key(key) {
            return Ok(());
        }
        let ty = &key.1;
        let universe = ctx.universe;

        if TypeUniverse::is_any_object(ty) {
            let any = self.any_schema();
            self.install(key, Slot::Done(any));
            return Ok(());
        }
        if universe.is_map_type(ty) {
            let map = self.map_schema();
            self.install(key, Slot::Done(map));
            return Ok(());
        }

        let schema = match universe.field_type(ty) {
            None => {
                return Err(ApiConfigError::unsupported_type(
                    "schema repository",
                    ty,
                    "type is unresolved or void",
                ))
            }
            Some(FieldType::Enum) => Arc::new(build_enum(ty, ctx)?),
            Some(FieldType::Array) => {
                self.install(key, Slot::Building);
                match self.build_array(ty, ctx) {
                    Ok(schema) => Arc::new(schema),
                    Err(e) => {
                        self.slots.remove(key);
                        return Err(e);
                    }
                }
            }
            Some(FieldType::Object) => {
                self.install(key, Slot::Building);
                match self.build_bean(ty, ctx) {
                    Ok(schema) => Arc::new(schema),
                    Err(e) => {
                        self.slots.remove(key);
                        return Err(e);
                    }
                }
            }
            Some(_) => {
                return Err(ApiConfigError::unsupported_type(
                    "schema repository",
                    ty,
                    "scalar types cannot be used as resources",
                ))
            }
        };
        debug!(schema = %schema.name, ty = %ty, "Compiled schema");
        self.install(key, Slot::Done(schema));
        Ok(())
    }

    fn build_array(&mut self, ty: &TypeRef, ctx: &BuildContext<'_>) -> Result<Schema> {
        let item = ctx.universe.array_item_type(ty).ok_or_else(|| {
            ApiConfigError::unsupported_type("schema repository", ty, "not a repeated type")
        })?;
        let items = self.build_field("items", &item, ctx)?;
        Ok(Schema::object(schema_name(ty, ctx)?).with_field(items))
    }

    fn build_bean(&mut self, ty: &TypeRef, ctx: &BuildContext<'_>) -> Result<Schema> {
        let universe = ctx.universe;
        let mut schema = Schema::object(schema_name(ty, ctx)?);
        schema.description = ty
            .raw_name()
            .and_then(|raw| universe.class(raw))
            .and_then(|def| def.description.clone());

        match transformer::resource_schema(universe, ty, Some(ctx.serialization))? {
            Some(resource) => {
                for prop in &resource.properties {
                    let field = self.build_field(&prop.name, &prop.ty, ctx)?;
                    schema.fields.insert(field.name.clone(), field);
                }
            }
            None => {
                for prop in universe.properties(ty)? {
                    let mut field = self.build_field(&prop.name, &prop.ty, ctx)?;
                    field.description = prop.description;
                    field.required = prop.required;
                    schema.fields.insert(field.name.clone(), field);
                }
            }
        }
        Ok(schema)
    }

    fn build_field(&mut self, name: &str, ty: &TypeRef, ctx: &BuildContext<'_>) -> Result<Field> {
        let resolved = transformer::schema_type(ctx.universe, ty, Some(ctx.serialization))?;
        let field_type = ctx.universe.field_type(&resolved).ok_or_else(|| {
            ApiConfigError::unsupported_type(
                format!("field '{name}'"),
                &resolved,
                "type is unresolved or void",
            )
        })?;
        let mut field = Field::scalar(name, field_type);
        match field_type {
            FieldType::Array => {
                let item = ctx.universe.array_item_type(&resolved).ok_or_else(|| {
                    ApiConfigError::unsupported_type(
                        format!("field '{name}'"),
                        &resolved,
                        "not a repeated type",
                    )
                })?;
                field.array_item = Some(Box::new(self.build_field(name, &item, ctx)?));
            }
            FieldType::Object | FieldType::Enum => {
                let key = (ctx.serialization.clone(), resolved);
                self.ensure(&key, ctx)?;
                field.schema_reference = Some(SchemaReference {
                    ty: key.1,
                    serialization: key.0,
                });
            }
            _ => {}
        }
        Ok(field)
    }
}

fn build_enum(ty: &TypeRef, ctx: &BuildContext<'_>) -> Result<Schema> {
    let raw = ty.raw_name().unwrap_or_default();
    let def = ctx.universe.require_class(raw, "schema repository")?;
    Ok(Schema {
        name: schema_name(ty, ctx)?,
        schema_type: SchemaType::String,
        fields: Default::default(),
        enum_values: def.enum_constants.clone(),
        enum_descriptions: vec![String::new(); def.enum_constants.len()],
        description: def.description.clone(),
    })
}

/// Schema name of an already resolved type: the resource schema name when a
/// resource transformer provides one, `Foo_Bar` for `Foo<Bar>`, and
/// `<Item>Collection` (capitalized) for repeated types.
fn schema_name(ty: &TypeRef, ctx: &BuildContext<'_>) -> Result<String> {
    if let Some(item) = ctx.universe.array_item_type(ty) {
        let item = transformer::schema_type(ctx.universe, &item, Some(ctx.serialization))?;
        return Ok(capitalize(&format!("{}Collection", schema_name(&item, ctx)?)));
    }
    match ty {
        TypeRef::Primitive(p) => Ok(p.as_str().to_string()),
        TypeRef::Class { name, args } => {
            if let Some(resource_name) =
                transformer::resource_schema(ctx.universe, ty, Some(ctx.serialization))?
                    .and_then(|r| r.name)
            {
                return Ok(resource_name);
            }
            let mut out = TypeRef::simple_class_name(name).to_string();
            for arg in args {
                out.push('_');
                out.push_str(&schema_name(arg, ctx)?);
            }
            Ok(out)
        }
        other => Err(ApiConfigError::unsupported_type(
            "schema naming",
            other,
            "type is unresolved",
        )),
    }
}
