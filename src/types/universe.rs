use super::type_ref::TypeRef;
use crate::error::{ApiConfigError, Result};
use crate::model::{
    ApiAnnotation, ApiClassAnnotation, ApiMethodAnnotation, ApiResourceProperty,
    ParameterAnnotation,
};
use crate::transformer::TransformerDef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

pub const OBJECT: &str = "Object";
pub const STRING: &str = "String";
pub const ENUM: &str = "Enum";
pub const COLLECTION: &str = "Collection";
pub const MAP: &str = "Map";
pub const JSON_MAP: &str = "JsonMap";
/// Supertype of generated client entities. Map-like by ancestry, but carries
/// concrete fields and is treated as a bean.
pub const GENERIC_DATA: &str = "GenericData";
pub const HTTP_REQUEST: &str = "HttpRequest";
pub const USER: &str = "User";
pub const REQUEST_CONTEXT: &str = "RequestContext";

/// Types supplied by the framework at call time rather than by the client.
pub const INJECTED_TYPES: [&str; 3] = [HTTP_REQUEST, USER, REQUEST_CONTEXT];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// A bean property as declared on a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Has a getter.
    #[serde(default = "default_true")]
    pub readable: bool,
    /// Has a setter.
    #[serde(default = "default_true")]
    pub writable: bool,
    #[serde(default, rename = "api")]
    pub resource_property: Option<ApiResourceProperty>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        PropertyDef {
            name: name.into(),
            ty,
            readable: true,
            writable: true,
            resource_property: None,
        }
    }
}

/// A method parameter and its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(flatten)]
    pub annotation: ParameterAnnotation,
}

impl ParamDef {
    pub fn new(ty: TypeRef) -> Self {
        ParamDef {
            ty,
            annotation: ParameterAnnotation::default(),
        }
    }

    pub fn named(ty: TypeRef, name: impl Into<String>) -> Self {
        ParamDef {
            ty,
            annotation: ParameterAnnotation {
                name: Some(name.into()),
                ..ParameterAnnotation::default()
            },
        }
    }
}

/// A method declared on a service class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    /// `None` (or `void`) for methods without a return value.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub api_method: Option<ApiMethodAnnotation>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDef {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            is_public: true,
            is_static: false,
            api_method: None,
        }
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    pub fn annotated(mut self, annotation: ApiMethodAnnotation) -> Self {
        self.api_method = Some(annotation);
        self
    }
}

/// Reflective metadata for one class, interface or enum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<String>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub properties: Vec<PropertyDef>,
    pub enum_constants: Vec<String>,
    /// Type-level transformer annotation.
    pub transformer: Option<String>,
    pub description: Option<String>,
    pub api: Option<ApiAnnotation>,
    pub api_class: Option<ApiClassAnnotation>,
    /// Class whose API annotation chain applies to this one.
    pub api_reference: Option<String>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            ..ClassDef::default()
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        ClassDef {
            kind: ClassKind::Interface,
            ..ClassDef::new(name)
        }
    }

    pub fn enumeration(name: impl Into<String>, constants: &[&str]) -> Self {
        ClassDef {
            kind: ClassKind::Enum,
            enum_constants: constants.iter().map(|c| c.to_string()).collect(),
            ..ClassDef::new(name)
        }
    }

    pub fn with_type_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn simple_name(&self) -> &str {
        TypeRef::simple_class_name(&self.name)
    }
}

/// A bean property after type-variable substitution and annotation handling.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperty {
    /// Serialized name (after any rename).
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub required: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Registry of every class and transformer the configuration compiler can see.
///
/// Built-in classes (scalars, collections, maps, injected framework types) are
/// registered by [`TypeUniverse::new`]; model files add the service's own
/// classes on top.
#[derive(Debug, Clone)]
pub struct TypeUniverse {
    classes: HashMap<String, ClassDef>,
    transformers: HashMap<String, TransformerDef>,
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse {
    pub fn new() -> Self {
        let mut universe = TypeUniverse {
            classes: HashMap::new(),
            transformers: HashMap::new(),
        };
        universe.register_builtins();
        universe
    }

    fn register_builtins(&mut self) {
        let object = || TypeRef::class(OBJECT);
        let var = TypeRef::variable;

        self.insert(ClassDef::new(OBJECT));
        for scalar in [
            STRING,
            "Boolean",
            "Byte",
            "Short",
            "Integer",
            "Long",
            "Float",
            "Double",
            "Character",
            "Void",
            "Date",
            "DateAndTime",
            "SimpleDate",
        ] {
            self.insert(ClassDef::new(scalar).extends(object()));
        }
        self.insert(
            ClassDef::new(ENUM)
                .with_type_params(&["E"])
                .extends(object()),
        );

        self.insert(ClassDef::interface(COLLECTION).with_type_params(&["E"]));
        for list in ["List", "Set"] {
            self.insert(
                ClassDef::interface(list)
                    .with_type_params(&["E"])
                    .implements(TypeRef::parameterized(COLLECTION, vec![var("E")])),
            );
        }
        for (class, iface) in [("ArrayList", "List"), ("HashSet", "Set")] {
            self.insert(
                ClassDef::new(class)
                    .with_type_params(&["E"])
                    .extends(object())
                    .implements(TypeRef::parameterized(iface, vec![var("E")])),
            );
        }

        self.insert(ClassDef::interface(MAP).with_type_params(&["K", "V"]));
        self.insert(
            ClassDef::new("HashMap")
                .with_type_params(&["K", "V"])
                .extends(object())
                .implements(TypeRef::parameterized(MAP, vec![var("K"), var("V")])),
        );
        let string_object_map =
            || TypeRef::parameterized(MAP, vec![TypeRef::class(STRING), TypeRef::class(OBJECT)]);
        self.insert(
            ClassDef::new(JSON_MAP).extends(TypeRef::parameterized(
                "HashMap",
                vec![TypeRef::class(STRING), TypeRef::class(OBJECT)],
            )),
        );
        self.insert(
            ClassDef::new(GENERIC_DATA)
                .extends(object())
                .implements(string_object_map()),
        );
        self.insert(ClassDef::new("GenericJson").extends(TypeRef::class(GENERIC_DATA)));

        for injected in INJECTED_TYPES {
            self.insert(ClassDef::interface(injected));
        }
    }

    fn insert(&mut self, def: ClassDef) {
        self.classes.insert(def.name.clone(), def);
    }

    /// Register (or replace) a class definition.
    pub fn register_class(&mut self, def: ClassDef) -> Result<()> {
        if def.name.trim().is_empty() {
            return Err(ApiConfigError::unknown_class(
                "class registration",
                "<empty class name>",
            ));
        }
        self.insert(def);
        Ok(())
    }

    pub fn register_transformer(&mut self, def: TransformerDef) {
        self.transformers.insert(def.name.clone(), def);
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    /// Every class and transformer definition, serialized in name order.
    /// Universes with equal definitions produce equal bytes.
    pub fn canonical_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let classes: BTreeMap<&str, &ClassDef> =
            self.classes.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let transformers: BTreeMap<&str, &TransformerDef> =
            self.transformers.iter().map(|(k, v)| (k.as_str(), v)).collect();
        serde_json::to_vec(&(classes, transformers))
    }

    pub fn require_class(&self, name: &str, location: &str) -> Result<&ClassDef> {
        self.class(name)
            .ok_or_else(|| ApiConfigError::unknown_class(location, name))
    }

    pub fn transformer(&self, name: &str) -> Option<&TransformerDef> {
        self.transformers.get(name)
    }

    pub fn require_transformer(&self, name: &str, location: &str) -> Result<&TransformerDef> {
        self.transformer(name)
            .ok_or_else(|| ApiConfigError::UnknownTransformer {
                location: location.to_string(),
                name: name.to_string(),
            })
    }

    /// Type-parameter bindings carried by a parameterized class reference.
    ///
    /// Raw references to generic classes bind nothing, so their type
    /// variables stay unresolved.
    pub fn binding_env(&self, ty: &TypeRef) -> HashMap<String, TypeRef> {
        let mut env = HashMap::new();
        if let TypeRef::Class { name, args } = ty {
            if let Some(def) = self.class(name) {
                for (param, arg) in def.type_params.iter().zip(args) {
                    env.insert(param.clone(), arg.clone());
                }
            }
        }
        env
    }

    /// Superclass and interfaces of `ty`, with type arguments substituted.
    pub fn direct_supertypes(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let TypeRef::Class { name, .. } = ty else {
            return Vec::new();
        };
        let Some(def) = self.class(name) else {
            return Vec::new();
        };
        let env = self.binding_env(ty);
        let mut out = Vec::new();
        if let Some(sup) = &def.superclass {
            out.push(sup.substitute(&env));
        } else if def.kind == ClassKind::Enum {
            out.push(TypeRef::parameterized(ENUM, vec![TypeRef::class(name.clone())]));
        }
        out.extend(def.interfaces.iter().map(|i| i.substitute(&env)));
        out
    }

    /// The ancestor closure of `ty`: itself first, then superclasses and
    /// interfaces breadth-first, so more specific types precede less specific ones.
    pub fn supertypes(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut out = Vec::new();
        let mut seen: HashSet<TypeRef> = HashSet::new();
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.erased()) {
                continue;
            }
            queue.extend(self.direct_supertypes(&next));
            out.push(next);
        }
        out
    }

    /// View `ty` as its ancestor with raw name `raw` (e.g. `List<Foo>` as
    /// `Collection<Foo>`).
    pub fn as_supertype(&self, ty: &TypeRef, raw: &str) -> Option<TypeRef> {
        self.supertypes(ty)
            .into_iter()
            .find(|t| t.raw_name() == Some(raw))
    }

    pub fn is_subtype_of(&self, ty: &TypeRef, raw: &str) -> bool {
        self.as_supertype(ty, raw).is_some()
    }

    /// True when `ancestor` (raw) appears in the ancestor closure of `ty`.
    pub fn is_supertype_of(&self, ancestor: &TypeRef, ty: &TypeRef) -> bool {
        match ancestor.raw_name() {
            Some(raw) => self.is_subtype_of(ty, raw),
            None => ancestor == ty,
        }
    }

    /// The serializable bean properties of `ty`, superclass properties first.
    ///
    /// Properties that are ignored, or have neither getter nor setter, are
    /// dropped. A property whose type still mentions a type variable after
    /// substitution fails with [`ApiConfigError::UnsupportedType`].
    pub fn properties(&self, ty: &TypeRef) -> Result<Vec<ResolvedProperty>> {
        let location = ty.to_string();
        let Some(raw) = ty.raw_name() else {
            return Err(ApiConfigError::unsupported_type(
                location,
                ty,
                "only classes have bean properties",
            ));
        };
        self.require_class(raw, &location)?;

        // Walk the superclass chain, then apply base-first so subclasses win.
        let mut chain = vec![ty.clone()];
        let mut current = ty.clone();
        loop {
            let superclass = current
                .raw_name()
                .and_then(|n| self.class(n))
                .and_then(|def| def.superclass.as_ref());
            let next = match superclass {
                Some(sup) => sup.substitute(&self.binding_env(&current)),
                None => break,
            };
            if next.raw_name() == Some(OBJECT) || chain.contains(&next) {
                break;
            }
            chain.push(next.clone());
            current = next;
        }

        let mut resolved: indexmap::IndexMap<String, ResolvedProperty> = indexmap::IndexMap::new();
        for owner in chain.iter().rev() {
            let Some(def) = owner.raw_name().and_then(|n| self.class(n)) else {
                continue;
            };
            let env = self.binding_env(owner);
            for prop in &def.properties {
                let annotation = prop.resource_property.clone().unwrap_or_default();
                if annotation.ignored.unwrap_or(false) || !(prop.readable || prop.writable) {
                    continue;
                }
                let prop_ty = prop.ty.substitute(&env);
                if prop_ty.is_unresolved() {
                    return Err(ApiConfigError::unsupported_type(
                        format!("{}.{}", def.name, prop.name),
                        &prop_ty,
                        format!("cannot resolve type variables of property through '{owner}'"),
                    ));
                }
                let name = annotation.name.clone().unwrap_or_else(|| prop.name.clone());
                resolved.insert(
                    name.clone(),
                    ResolvedProperty {
                        name,
                        ty: prop_ty,
                        description: annotation.description.clone(),
                        required: annotation.required,
                    },
                );
            }
        }
        Ok(resolved.into_values().collect())
    }
}
