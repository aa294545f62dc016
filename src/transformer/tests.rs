#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::types::ClassDef;

fn ty(s: &str) -> TypeRef {
    s.parse().unwrap()
}

fn universe() -> TypeUniverse {
    let mut universe = TypeUniverse::new();
    universe.register_class(ClassDef::new("Foo")).unwrap();
    universe.register_class(ClassDef::new("Base")).unwrap();
    universe
        .register_class(ClassDef::new("Derived").extends(ty("Base")))
        .unwrap();
    universe
        .register_class(ClassDef::new("Wrapper").with_type_params(&["T"]))
        .unwrap();
    universe
        .register_class(ClassDef::new("FooWrapper").extends(ty("Wrapper<Foo>")))
        .unwrap();
    universe.register_transformer(TransformerDef::new("BaseToString", ty("Base"), ty("String")));
    universe.register_transformer(TransformerDef::new(
        "DerivedToString",
        ty("Derived"),
        ty("String"),
    ));
    universe.register_transformer(TransformerDef::new(
        "WrapperToList",
        ty("Wrapper<T>"),
        ty("List<T>"),
    ));
    universe
}

#[test]
fn test_most_specific_registration_shadows_supertypes() {
    let universe = universe();
    let mut config = ApiSerializationConfig::new();
    config.add_serializer(&universe, "BaseToString").unwrap();
    config.add_serializer(&universe, "DerivedToString").unwrap();

    assert_eq!(
        serializer_classes(&universe, &ty("Derived"), Some(&config)),
        vec!["DerivedToString".to_string()]
    );
    assert_eq!(
        serializer_classes(&universe, &ty("Base"), Some(&config)),
        vec!["BaseToString".to_string()]
    );
}

#[test]
fn test_inherited_registration_applies_to_subtypes() {
    let universe = universe();
    let mut config = ApiSerializationConfig::new();
    config.add_serializer(&universe, "BaseToString").unwrap();

    assert_eq!(
        serializer_classes(&universe, &ty("Derived"), Some(&config)),
        vec!["BaseToString".to_string()]
    );
    assert!(serializer_classes(&universe, &ty("Derived"), None).is_empty());
}

#[test]
fn test_type_annotation_beats_api_registration() {
    let mut universe = universe();
    let mut annotated = ClassDef::new("Annotated").extends(ty("Base"));
    annotated.transformer = Some("AnnotatedToString".to_string());
    universe.register_class(annotated).unwrap();
    universe.register_transformer(TransformerDef::new(
        "AnnotatedToString",
        ty("Annotated"),
        ty("String"),
    ));
    let mut config = ApiSerializationConfig::new();
    config.add_serializer(&universe, "BaseToString").unwrap();

    assert_eq!(
        serializer_classes(&universe, &ty("Annotated"), Some(&config)),
        vec!["AnnotatedToString".to_string()]
    );
}

#[test]
fn test_non_class_types_have_no_serializers() {
    let universe = universe();
    assert!(serializer_classes(&universe, &ty("int"), None).is_empty());
    assert!(serializer_classes(&universe, &ty("Foo[]"), None).is_empty());
    assert!(serializer_classes(&universe, &ty("T"), None).is_empty());
}

#[test]
fn test_later_registration_for_same_source_replaces_earlier() {
    let mut universe = universe();
    universe.register_transformer(TransformerDef::new("BaseToLong", ty("Base"), ty("Long")));
    let mut config = ApiSerializationConfig::new();
    config.add_serializer(&universe, "BaseToString").unwrap();
    config.add_serializer(&universe, "BaseToLong").unwrap();

    assert_eq!(config.serializers().len(), 1);
    assert_eq!(
        config.serializer_config(&ty("Base")).unwrap().transformer,
        "BaseToLong"
    );
}

#[test]
fn test_unknown_transformer_registration_fails() {
    let universe = universe();
    let mut config = ApiSerializationConfig::new();
    let err = config.add_serializer(&universe, "Missing").unwrap_err();
    assert!(matches!(err, ApiConfigError::UnknownTransformer { ref name, .. } if name == "Missing"));
    assert!(config.is_empty());
}

#[test]
fn test_constructor_shapes_tried_in_order() {
    let mut universe = universe();
    universe.register_transformer(
        TransformerDef::new("Both", ty("Foo"), ty("String"))
            .with_constructors(&[ConstructorShape::NoArg, ConstructorShape::RawClass]),
    );
    universe.register_transformer(
        TransformerDef::new("All", ty("Foo"), ty("String")).with_constructors(&[
            ConstructorShape::NoArg,
            ConstructorShape::RawClass,
            ConstructorShape::TypeArgument,
        ]),
    );

    let t = instantiate(&universe, "Both", &ty("Foo")).unwrap();
    assert_eq!(t.constructor, ConstructorShape::RawClass);
    let t = instantiate(&universe, "All", &ty("Foo")).unwrap();
    assert_eq!(t.constructor, ConstructorShape::TypeArgument);
    let t = instantiate(&universe, "BaseToString", &ty("Derived")).unwrap();
    assert_eq!(t.constructor, ConstructorShape::NoArg);
    assert_eq!(t.bound_type, ty("Derived"));
}

#[test]
fn test_no_usable_constructor_names_attempts() {
    let mut universe = universe();
    universe.register_transformer(
        TransformerDef::new("Broken", ty("Foo"), ty("String")).with_constructors(&[]),
    );

    match instantiate(&universe, "Broken", &ty("Foo")).unwrap_err() {
        ApiConfigError::TransformerInstantiation {
            transformer,
            ty,
            attempted,
        } => {
            assert_eq!(transformer, "Broken");
            assert_eq!(ty, "Foo");
            assert_eq!(attempted, "(Type), (Class), ()");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_source_type_mismatch() {
    let universe = universe();
    let err = instantiate(&universe, "BaseToString", &ty("Foo")).unwrap_err();
    assert!(matches!(err, ApiConfigError::TransformerSourceMismatch { .. }));
}

#[test]
fn test_target_type_variables_bound_from_source() {
    let universe = universe();

    let t = instantiate(&universe, "WrapperToList", &ty("Wrapper<Foo>")).unwrap();
    assert_eq!(t.serialized_type, ty("List<Foo>"));

    // Bound through the subclass's view of its generic superclass.
    let t = instantiate(&universe, "WrapperToList", &ty("FooWrapper")).unwrap();
    assert_eq!(t.serialized_type, ty("List<Foo>"));
}

#[test]
fn test_resource_transformer_keeps_schema_type() {
    let mut universe = universe();
    universe.register_transformer(
        TransformerDef::new("FooResource", ty("Foo"), ty("Foo")).with_resource(ResourceSchemaDef {
            name: Some("FooView".to_string()),
            properties: vec![ResourcePropertyDef {
                name: "label".to_string(),
                ty: ty("String"),
            }],
        }),
    );
    let mut config = ApiSerializationConfig::new();
    config.add_serializer(&universe, "FooResource").unwrap();
    config.add_serializer(&universe, "BaseToString").unwrap();

    assert_eq!(schema_type(&universe, &ty("Foo"), Some(&config)).unwrap(), ty("Foo"));
    let resource = resource_schema(&universe, &ty("Foo"), Some(&config))
        .unwrap()
        .unwrap();
    assert_eq!(resource.name.as_deref(), Some("FooView"));
    assert_eq!(resource.properties.len(), 1);

    assert_eq!(schema_type(&universe, &ty("Base"), Some(&config)).unwrap(), ty("String"));
    assert!(resource_schema(&universe, &ty("Base"), Some(&config)).unwrap().is_none());
}

#[test]
fn test_repeated_item_serializers_look_at_items() {
    let universe = universe();
    let mut config = ApiSerializationConfig::new();
    config.add_serializer(&universe, "BaseToString").unwrap();

    assert_eq!(
        repeated_item_serializers(&universe, &ty("List<Derived>"), Some(&config)),
        vec!["BaseToString".to_string()]
    );
    assert!(repeated_item_serializers(&universe, &ty("Derived"), Some(&config)).is_empty());
    assert!(repeated_item_serializers(&universe, &ty("List<Foo>"), Some(&config)).is_empty());
}
