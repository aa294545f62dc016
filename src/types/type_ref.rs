use crate::error::{ApiConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Primitive (unboxed) scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Void,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
            Primitive::Void => "void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let p = match s {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "char" => Primitive::Char,
            "void" => Primitive::Void,
            _ => return None,
        };
        Some(p)
    }

    /// Name of the boxed class registered for this primitive.
    pub fn boxed_name(&self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::Char => "Character",
            Primitive::Void => "Void",
        }
    }
}

/// A reflective type description.
///
/// Maps are not a separate variant: a class is map-like when its ancestry
/// reaches `Map` (see [`crate::types::TypeUniverse::is_map_type`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Primitive(Primitive),
    /// A raw (`args` empty) or parameterized class.
    Class { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Variable(String),
    Wildcard { upper: Option<Box<TypeRef>> },
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn parameterized(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args,
        }
    }

    pub fn array(item: TypeRef) -> Self {
        TypeRef::Array(Box::new(item))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TypeRef::Variable(name.into())
    }

    /// Name of the raw class, or `None` for primitives, arrays, variables and wildcards.
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The raw class with its type arguments erased.
    pub fn erased(&self) -> TypeRef {
        match self {
            TypeRef::Class { name, .. } => TypeRef::class(name.clone()),
            TypeRef::Array(item) => TypeRef::array(item.erased()),
            other => other.clone(),
        }
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Class { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive(Primitive::Void))
    }

    /// True when this type is, or contains, a type variable or wildcard.
    pub fn is_unresolved(&self) -> bool {
        match self {
            TypeRef::Variable(_) | TypeRef::Wildcard { .. } => true,
            TypeRef::Class { args, .. } => args.iter().any(TypeRef::is_unresolved),
            TypeRef::Array(item) => item.is_unresolved(),
            TypeRef::Primitive(_) => false,
        }
    }

    /// Replace type variables bound in `env`. Unbound variables are kept.
    pub fn substitute(&self, env: &HashMap<String, TypeRef>) -> TypeRef {
        if env.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Variable(name) => env.get(name).cloned().unwrap_or_else(|| self.clone()),
            TypeRef::Class { name, args } => TypeRef::Class {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(env)).collect(),
            },
            TypeRef::Array(item) => TypeRef::array(item.substitute(env)),
            TypeRef::Wildcard { upper } => TypeRef::Wildcard {
                upper: upper.as_ref().map(|u| Box::new(u.substitute(env))),
            },
            TypeRef::Primitive(_) => self.clone(),
        }
    }

    /// Last segment of a dotted class name (`com.example.Foo` -> `Foo`).
    pub fn simple_class_name(name: &str) -> &str {
        name.rsplit('.').next().unwrap_or(name)
    }
}

fn is_variable_name(ident: &str) -> bool {
    let mut chars = ident.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_digit())
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, reason: impl Into<String>) -> ApiConfigError {
        ApiConfigError::InvalidTypeExpression {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.input[self.pos..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let start = self.pos;
        for c in self.input[self.pos..].chars() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error(format!("expected a type name at offset {start}")));
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        let base = if self.eat('?') {
            self.skip_ws();
            let upper = if self.input[self.pos..].starts_with("extends") {
                self.pos += "extends".len();
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            TypeRef::Wildcard { upper }
        } else {
            let ident = self.ident()?;
            if let Some(p) = Primitive::parse(ident) {
                TypeRef::Primitive(p)
            } else if is_variable_name(ident) {
                TypeRef::Variable(ident.to_string())
            } else {
                let mut args = Vec::new();
                if self.eat('<') {
                    loop {
                        args.push(self.parse_type()?);
                        if self.eat(',') {
                            continue;
                        }
                        if self.eat('>') {
                            break;
                        }
                        return Err(self.error("expected ',' or '>'"));
                    }
                }
                TypeRef::Class {
                    name: ident.to_string(),
                    args,
                }
            }
        };

        let mut ty = base;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            ty = TypeRef::array(ty);
        }
        Ok(ty)
    }
}

impl FromStr for TypeRef {
    type Err = ApiConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = TypeParser { input: s, pos: 0 };
        let ty = parser.parse_type()?;
        if parser.peek().is_some() {
            return Err(parser.error(format!("unexpected trailing input at offset {}", parser.pos)));
        }
        Ok(ty)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = ApiConfigError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{}", p.as_str()),
            TypeRef::Class { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array(item) => write!(f, "{item}[]"),
            TypeRef::Variable(name) => write!(f, "{name}"),
            TypeRef::Wildcard { upper: None } => write!(f, "?"),
            TypeRef::Wildcard { upper: Some(upper) } => write!(f, "? extends {upper}"),
        }
    }
}
