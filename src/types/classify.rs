//! Type classification: repeated, enum, map, "any object", scalar and injected
//! checks over [`TypeRef`]s, resolved against a [`TypeUniverse`].
//!
//! All checks are side-effect free. Unresolved type variables and wildcards
//! classify as nothing in particular; callers surface them as
//! `UNKNOWN`/unsupported-type errors.

use super::type_ref::{Primitive, TypeRef};
use super::universe::{
    ClassKind, TypeUniverse, COLLECTION, ENUM, GENERIC_DATA, INJECTED_TYPES, MAP, OBJECT,
};
use crate::schema::FieldType;

impl TypeUniverse {
    /// True for native arrays (except `byte[]`) and descendants of `Collection`.
    pub fn is_array_type(&self, ty: &TypeRef) -> bool {
        self.array_item_type(ty).is_some()
    }

    /// Item type of a repeated type. `byte[]` is an opaque byte string, not an array.
    ///
    /// A raw collection yields its unbound item variable (`E`), which later
    /// fails as an unsupported type.
    pub fn array_item_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        match ty {
            TypeRef::Array(item) if **item == TypeRef::Primitive(Primitive::Byte) => None,
            TypeRef::Array(item) => Some((**item).clone()),
            TypeRef::Class { .. } => self.as_supertype(ty, COLLECTION).map(|collection| {
                collection
                    .type_args()
                    .first()
                    .cloned()
                    .unwrap_or_else(|| self.collection_item_variable())
            }),
            _ => None,
        }
    }

    fn collection_item_variable(&self) -> TypeRef {
        let name = self
            .class(COLLECTION)
            .and_then(|def| def.type_params.first().cloned())
            .unwrap_or_else(|| "E".to_string());
        TypeRef::Variable(name)
    }

    pub fn is_enum_type(&self, ty: &TypeRef) -> bool {
        match ty.raw_name() {
            Some(ENUM) => false,
            Some(name) => {
                self.class(name).map(|c| c.kind) == Some(ClassKind::Enum)
                    || self.is_subtype_of(ty, ENUM)
            }
            None => false,
        }
    }

    /// Map-like types, excluding generated-client entities that merely
    /// implement `Map` while carrying concrete fields.
    pub fn is_map_type(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Class { .. })
            && self.is_subtype_of(ty, MAP)
            && !self.is_subtype_of(ty, GENERIC_DATA)
    }

    pub fn map_value_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        if !self.is_map_type(ty) {
            return None;
        }
        self.as_supertype(ty, MAP)
            .and_then(|m| m.type_args().get(1).cloned())
    }

    /// Exactly `Object`, not its subtypes.
    pub fn is_any_object(ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Class { name, args } if name == OBJECT && args.is_empty())
    }

    /// Framework-supplied parameter types.
    pub fn is_injected_type(&self, ty: &TypeRef) -> bool {
        INJECTED_TYPES
            .iter()
            .any(|injected| self.is_subtype_of(ty, injected))
    }

    /// Schema field type of `ty`, or `None` for `void` and unresolved types.
    pub fn field_type(&self, ty: &TypeRef) -> Option<FieldType> {
        let field_type = match ty {
            TypeRef::Primitive(p) => match p {
                Primitive::Boolean => FieldType::Boolean,
                Primitive::Byte => FieldType::Int8,
                Primitive::Short => FieldType::Int16,
                Primitive::Int => FieldType::Int32,
                Primitive::Long => FieldType::Int64,
                Primitive::Float => FieldType::Float,
                Primitive::Double => FieldType::Double,
                Primitive::Char => FieldType::String,
                Primitive::Void => return None,
            },
            TypeRef::Array(item) if **item == TypeRef::Primitive(Primitive::Byte) => {
                FieldType::ByteString
            }
            TypeRef::Array(_) => FieldType::Array,
            TypeRef::Variable(_) | TypeRef::Wildcard { .. } => return None,
            TypeRef::Class { name, .. } => match name.as_str() {
                "String" | "Character" => FieldType::String,
                "Boolean" => FieldType::Boolean,
                "Byte" => FieldType::Int8,
                "Short" => FieldType::Int16,
                "Integer" => FieldType::Int32,
                "Long" => FieldType::Int64,
                "Float" => FieldType::Float,
                "Double" => FieldType::Double,
                "Date" | "DateAndTime" => FieldType::DateTime,
                "SimpleDate" => FieldType::Date,
                _ if self.is_enum_type(ty) => FieldType::Enum,
                _ if self.is_array_type(ty) => FieldType::Array,
                _ => FieldType::Object,
            },
        };
        Some(field_type)
    }

    /// Scalar and enum types, which can travel as path or query parameters.
    pub fn is_parameter_type(&self, ty: &TypeRef) -> bool {
        matches!(self.field_type(ty), Some(ft) if ft.is_scalar())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::types::ClassDef;

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_byte_array_is_not_repeated() {
        let universe = TypeUniverse::new();
        assert!(!universe.is_array_type(&ty("byte[]")));
        assert_eq!(universe.field_type(&ty("byte[]")), Some(FieldType::ByteString));
        assert!(universe.is_array_type(&ty("Byte[]")));
        assert_eq!(universe.array_item_type(&ty("int[]")), Some(ty("int")));
    }

    #[test]
    fn test_collection_item_type_through_ancestry() {
        let universe = TypeUniverse::new();
        assert_eq!(universe.array_item_type(&ty("List<String>")), Some(ty("String")));
        assert_eq!(universe.array_item_type(&ty("HashSet<Long>")), Some(ty("Long")));
        assert_eq!(universe.array_item_type(&ty("ArrayList")), Some(ty("E")));
        assert_eq!(universe.array_item_type(&ty("Collection")), Some(ty("E")));
        assert_eq!(universe.field_type(&ty("Collection")), Some(FieldType::Array));
        assert_eq!(universe.field_type(&ty("E")), None);
        assert!(!universe.is_array_type(&ty("Map<String, String>")));
    }

    #[test]
    fn test_map_excludes_generic_data() {
        let mut universe = TypeUniverse::new();
        universe
            .register_class(ClassDef::new("Entity").extends(ty("GenericJson")))
            .unwrap();
        assert!(universe.is_map_type(&ty("HashMap<String, Integer>")));
        assert!(universe.is_map_type(&ty("JsonMap")));
        assert!(!universe.is_map_type(&ty("Entity")));
        assert_eq!(
            universe.map_value_type(&ty("HashMap<String, Integer>")),
            Some(ty("Integer"))
        );
    }

    #[test]
    fn test_any_object_is_exact() {
        let mut universe = TypeUniverse::new();
        universe.register_class(ClassDef::new("Foo")).unwrap();
        assert!(TypeUniverse::is_any_object(&ty("Object")));
        assert!(!TypeUniverse::is_any_object(&ty("Foo")));
    }

    #[test]
    fn test_enum_classification() {
        let mut universe = TypeUniverse::new();
        universe
            .register_class(ClassDef::enumeration("Color", &["RED", "GREEN"]))
            .unwrap();
        assert!(universe.is_enum_type(&ty("Color")));
        assert!(universe.is_parameter_type(&ty("Color")));
        assert!(!universe.is_enum_type(&ty("String")));
    }

    #[test]
    fn test_unresolved_types_have_no_field_type() {
        let universe = TypeUniverse::new();
        assert_eq!(universe.field_type(&ty("T")), None);
        assert_eq!(universe.field_type(&ty("?")), None);
        assert_eq!(universe.field_type(&ty("void")), None);
        assert!(ty("List<? extends Foo>").is_unresolved());
    }
}
