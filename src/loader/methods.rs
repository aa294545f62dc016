use crate::config::EndpointMethod;
use crate::error::Result;
use crate::types::{MethodDef, TypeRef, TypeUniverse, OBJECT};
use std::collections::HashSet;

/// The methods a service class exposes: public, non-static methods of the
/// class and its superclasses, most derived declaration winning for
/// overrides. Parameter and return types are resolved through the service
/// class's view of each superclass, so `FooEndpoint extends Base<Foo>` turns
/// `insert(T)` into `insert(Foo)`.
pub fn endpoint_methods<'u>(
    universe: &'u TypeUniverse,
    service_class: &str,
) -> Result<Vec<(EndpointMethod, &'u MethodDef)>> {
    universe.require_class(service_class, "endpoint methods")?;

    let mut out = Vec::new();
    let mut seen: HashSet<(String, Vec<TypeRef>)> = HashSet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut view = Some(TypeRef::class(service_class));

    while let Some(current) = view.take() {
        let Some(def) = current.raw_name().and_then(|n| universe.class(n)) else {
            break;
        };
        if def.name == OBJECT || !visited.insert(def.name.clone()) {
            break;
        }
        let env = universe.binding_env(&current);

        for method in def.methods.iter().filter(|m| m.is_public && !m.is_static) {
            let parameter_types: Vec<TypeRef> =
                method.params.iter().map(|p| p.ty.substitute(&env)).collect();
            let signature = (
                method.name.clone(),
                parameter_types.iter().map(TypeRef::erased).collect::<Vec<_>>(),
            );
            if !seen.insert(signature) {
                continue;
            }
            let endpoint_method = EndpointMethod {
                service_class: service_class.to_string(),
                declaring_class: def.name.clone(),
                name: method.name.clone(),
                parameter_types,
                return_type: method
                    .return_type
                    .as_ref()
                    .filter(|ty| !ty.is_void())
                    .map(|ty| ty.substitute(&env)),
            };
            out.push((endpoint_method, method));
        }

        view = def.superclass.as_ref().map(|sup| sup.substitute(&env));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::types::{ClassDef, ParamDef};

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_generic_superclass_methods_are_resolved() {
        let mut universe = TypeUniverse::new();
        universe.register_class(ClassDef::new("Foo")).unwrap();
        universe
            .register_class(
                ClassDef::new("Base")
                    .with_type_params(&["T"])
                    .method(MethodDef::new("insert").param(ParamDef::new(ty("T"))).returns(ty("T"))),
            )
            .unwrap();
        universe
            .register_class(ClassDef::new("FooEndpoint").extends(ty("Base<Foo>")))
            .unwrap();

        let methods = endpoint_methods(&universe, "FooEndpoint").unwrap();
        assert_eq!(methods.len(), 1);
        let (m, _) = &methods[0];
        assert_eq!(m.declaring_class, "Base");
        assert_eq!(m.service_class, "FooEndpoint");
        assert_eq!(m.parameter_types, vec![ty("Foo")]);
        assert_eq!(m.return_type, Some(ty("Foo")));
    }

    #[test]
    fn test_overrides_collapse_and_hidden_methods_are_skipped() {
        let mut universe = TypeUniverse::new();
        let mut private = MethodDef::new("helper");
        private.is_public = false;
        let mut factory = MethodDef::new("create");
        factory.is_static = true;
        universe
            .register_class(
                ClassDef::new("Base")
                    .method(MethodDef::new("get").returns(ty("String")))
                    .method(MethodDef::new("list").returns(ty("List<String>"))),
            )
            .unwrap();
        universe
            .register_class(
                ClassDef::new("Service")
                    .extends(ty("Base"))
                    .method(MethodDef::new("get").returns(ty("String")))
                    .method(private)
                    .method(factory),
            )
            .unwrap();

        let methods = endpoint_methods(&universe, "Service").unwrap();
        let names: Vec<_> = methods
            .iter()
            .map(|(m, _)| format!("{}.{}", m.declaring_class, m.name))
            .collect();
        assert_eq!(names, vec!["Service.get", "Base.list"]);
    }

    #[test]
    fn test_void_return_is_none() {
        let mut universe = TypeUniverse::new();
        universe
            .register_class(ClassDef::new("Service").method(MethodDef::new("ping").returns(ty("void"))))
            .unwrap();
        let methods = endpoint_methods(&universe, "Service").unwrap();
        assert_eq!(methods[0].0.return_type, None);
    }
}
