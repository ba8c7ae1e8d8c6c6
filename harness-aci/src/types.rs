//! Type descriptors for entry point arguments and results.
//!
//! A `TypeDesc` is read either from the compiler's ACI JSON
//! (`{"option": ["address"]}`) or from source type syntax
//! (`option(address)`), and renders back to both.

use crate::error::{AciError, AciResult};
use serde_json::{json, Map as JsonMap, Value as Json};
use std::fmt;

/// A contract-level type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Int,
    Bool,
    String,
    Address,
    /// Sized byte array; `None` for unsized `bytes`.
    Bytes(Option<usize>),
    Unit,
    Option(Box<TypeDesc>),
    List(Box<TypeDesc>),
    Map(Box<TypeDesc>, Box<TypeDesc>),
    Tuple(Vec<TypeDesc>),
    Record(Vec<(String, TypeDesc)>),
    /// Contract references and user typedefs, kept by name.
    Named(String),
}

impl TypeDesc {
    /// `option(inner)`.
    #[must_use]
    pub fn option(inner: TypeDesc) -> Self {
        Self::Option(Box::new(inner))
    }

    /// `list(inner)`.
    #[must_use]
    pub fn list(inner: TypeDesc) -> Self {
        Self::List(Box::new(inner))
    }

    /// `map(key, value)`.
    #[must_use]
    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Reads the compiler's ACI JSON type representation.
    ///
    /// # Errors
    ///
    /// Returns `AciError::InvalidAci` for shapes the compiler never emits.
    pub fn from_aci_json(json: &Json) -> AciResult<Self> {
        match json {
            Json::String(name) => Ok(Self::from_name(name)),
            Json::Object(obj) if obj.len() == 1 => {
                let (key, body) = obj
                    .iter()
                    .next()
                    .ok_or_else(|| AciError::invalid_aci("empty type object"))?;
                match key.as_str() {
                    "option" => Ok(Self::option(single_param(key, body)?)),
                    "list" => Ok(Self::list(single_param(key, body)?)),
                    "map" => {
                        let params = params(key, body)?;
                        match <[TypeDesc; 2]>::try_from(params) {
                            Ok([k, v]) => Ok(Self::map(k, v)),
                            Err(_) => Err(AciError::invalid_aci("map expects two parameters")),
                        }
                    }
                    "tuple" => {
                        let params = params(key, body)?;
                        Ok(if params.is_empty() {
                            Self::Unit
                        } else {
                            Self::Tuple(params)
                        })
                    }
                    "bytes" => match body {
                        Json::Number(n) => Ok(Self::Bytes(n.as_u64().map(|n| n as usize))),
                        Json::String(s) if s == "any" => Ok(Self::Bytes(None)),
                        other => Err(AciError::invalid_aci(format!("bad bytes size: {other}"))),
                    },
                    "record" => {
                        let fields = body
                            .as_array()
                            .ok_or_else(|| AciError::invalid_aci("record fields must be a list"))?;
                        fields
                            .iter()
                            .map(|field| {
                                let name = field
                                    .get("name")
                                    .and_then(Json::as_str)
                                    .ok_or_else(|| AciError::invalid_aci("record field without name"))?;
                                let ty = field
                                    .get("type")
                                    .ok_or_else(|| AciError::invalid_aci("record field without type"))?;
                                Ok((name.to_string(), Self::from_aci_json(ty)?))
                            })
                            .collect::<AciResult<Vec<_>>>()
                            .map(Self::Record)
                    }
                    other => Ok(Self::Named(other.to_string())),
                }
            }
            other => Err(AciError::invalid_aci(format!("unsupported type form: {other}"))),
        }
    }

    /// Renders the compiler's ACI JSON representation.
    #[must_use]
    pub fn to_aci_json(&self) -> Json {
        match self {
            Self::Int => json!("int"),
            Self::Bool => json!("bool"),
            Self::String => json!("string"),
            Self::Address => json!("address"),
            Self::Bytes(Some(32)) => json!("hash"),
            Self::Bytes(Some(n)) => json!({ "bytes": n }),
            Self::Bytes(None) => json!({ "bytes": "any" }),
            Self::Unit => json!({ "tuple": [] }),
            Self::Option(inner) => json!({ "option": [inner.to_aci_json()] }),
            Self::List(inner) => json!({ "list": [inner.to_aci_json()] }),
            Self::Map(k, v) => json!({ "map": [k.to_aci_json(), v.to_aci_json()] }),
            Self::Tuple(items) => {
                json!({ "tuple": items.iter().map(Self::to_aci_json).collect::<Vec<_>>() })
            }
            Self::Record(fields) => json!({
                "record": fields
                    .iter()
                    .map(|(name, ty)| json!({ "name": name, "type": ty.to_aci_json() }))
                    .collect::<Vec<_>>()
            }),
            Self::Named(name) => json!(name),
        }
    }

    /// Parses source type syntax such as `map(address, list(int))` or
    /// `int * bool`.
    ///
    /// # Errors
    ///
    /// Returns `AciError::InvalidType` with the position of the problem.
    pub fn parse(input: &str) -> AciResult<Self> {
        let mut parser = TypeParser::new(input);
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }

    fn from_name(name: &str) -> Self {
        match name {
            "int" => Self::Int,
            "bool" => Self::Bool,
            "string" => Self::String,
            "address" => Self::Address,
            "hash" => Self::Bytes(Some(32)),
            "signature" => Self::Bytes(Some(64)),
            "unit" => Self::Unit,
            "bytes" => Self::Bytes(None),
            other => Self::Named(other.to_string()),
        }
    }
}

fn params(key: &str, body: &Json) -> AciResult<Vec<TypeDesc>> {
    body.as_array()
        .ok_or_else(|| AciError::invalid_aci(format!("{key} parameters must be a list")))?
        .iter()
        .map(TypeDesc::from_aci_json)
        .collect()
}

fn single_param(key: &str, body: &Json) -> AciResult<TypeDesc> {
    let mut list = params(key, body)?;
    if list.len() != 1 {
        return Err(AciError::invalid_aci(format!(
            "{key} expects one parameter, got {}",
            list.len()
        )));
    }
    Ok(list.remove(0))
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Address => f.write_str("address"),
            Self::Bytes(Some(n)) => write!(f, "bytes({n})"),
            Self::Bytes(None) => f.write_str("bytes"),
            Self::Unit => f.write_str("unit"),
            Self::Option(inner) => write!(f, "option({inner})"),
            Self::List(inner) => write!(f, "list({inner})"),
            Self::Map(k, v) => write!(f, "map({k}, {v})"),
            Self::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" * ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} : {ty}")?;
                }
                f.write_str("}")
            }
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Recursive-descent parser over source type syntax.
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> AciResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn error(&self, message: &str) -> AciError {
        AciError::InvalidType {
            input: self.input.to_string(),
            message: format!("{message} at offset {}", self.pos),
        }
    }

    fn ident(&mut self) -> AciResult<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '\'')))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 || rest.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected type name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn number(&mut self) -> AciResult<usize> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        let value = rest[..len]
            .parse()
            .map_err(|_| self.error("expected byte size"))?;
        self.pos += len;
        Ok(value)
    }

    /// type := atom ('*' atom)*
    fn parse_type(&mut self) -> AciResult<TypeDesc> {
        let first = self.parse_atom()?;
        let mut items = vec![first];
        while self.eat('*') {
            items.push(self.parse_atom()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            TypeDesc::Tuple(items)
        })
    }

    fn parse_atom(&mut self) -> AciResult<TypeDesc> {
        if self.eat('(') {
            if self.eat(')') {
                return Ok(TypeDesc::Unit);
            }
            let inner = self.parse_type()?;
            self.expect(')')?;
            return Ok(inner);
        }

        let name = self.ident()?;
        match name {
            "option" | "list" => {
                self.expect('(')?;
                let inner = self.parse_type()?;
                self.expect(')')?;
                Ok(if name == "option" {
                    TypeDesc::option(inner)
                } else {
                    TypeDesc::list(inner)
                })
            }
            "map" => {
                self.expect('(')?;
                let key = self.parse_type()?;
                self.expect(',')?;
                let value = self.parse_type()?;
                self.expect(')')?;
                Ok(TypeDesc::map(key, value))
            }
            "bytes" => {
                if self.eat('(') {
                    let size = self.number()?;
                    self.expect(')')?;
                    Ok(TypeDesc::Bytes(Some(size)))
                } else {
                    Ok(TypeDesc::Bytes(None))
                }
            }
            other => {
                // type parameters of user types are not tracked
                if self.eat('(') {
                    loop {
                        self.parse_type()?;
                        if !self.eat(',') {
                            break;
                        }
                    }
                    self.expect(')')?;
                }
                Ok(TypeDesc::from_name(other))
            }
        }
    }
}

/// Shorthand for a JSON object with a single key, used by value encoding.
pub(crate) fn tagged(key: &str, body: Json) -> Json {
    let mut map = JsonMap::new();
    map.insert(key.to_string(), body);
    Json::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_source_types() {
        assert_eq!(
            TypeDesc::parse("map(address, list(option(int)))").unwrap(),
            TypeDesc::map(
                TypeDesc::Address,
                TypeDesc::list(TypeDesc::option(TypeDesc::Int))
            )
        );
    }

    #[test]
    fn parse_tuple_and_unit() {
        assert_eq!(
            TypeDesc::parse("(int * bool * string)").unwrap(),
            TypeDesc::Tuple(vec![TypeDesc::Int, TypeDesc::Bool, TypeDesc::String])
        );
        assert_eq!(TypeDesc::parse("unit").unwrap(), TypeDesc::Unit);
        assert_eq!(TypeDesc::parse("()").unwrap(), TypeDesc::Unit);
    }

    #[test]
    fn parse_bytes_and_named() {
        assert_eq!(TypeDesc::parse("bytes(32)").unwrap(), TypeDesc::Bytes(Some(32)));
        assert_eq!(TypeDesc::parse("hash").unwrap(), TypeDesc::Bytes(Some(32)));
        assert_eq!(
            TypeDesc::parse("NFT.metadata").unwrap(),
            TypeDesc::Named("NFT.metadata".into())
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(TypeDesc::parse("map(int)").is_err());
        assert!(TypeDesc::parse("int )").is_err());
        assert!(TypeDesc::parse("").is_err());
    }

    #[test]
    fn aci_json_roundtrip_for_compound_types() {
        let ty = TypeDesc::map(
            TypeDesc::Address,
            TypeDesc::Tuple(vec![TypeDesc::Int, TypeDesc::option(TypeDesc::String)]),
        );
        assert_eq!(TypeDesc::from_aci_json(&ty.to_aci_json()).unwrap(), ty);
    }

    #[test]
    fn aci_json_empty_tuple_is_unit() {
        let ty = TypeDesc::from_aci_json(&json!({ "tuple": [] })).unwrap();
        assert_eq!(ty, TypeDesc::Unit);
    }

    #[test]
    fn display_uses_source_syntax() {
        let ty = TypeDesc::parse("option(map(string, int))").unwrap();
        assert_eq!(ty.to_string(), "option(map(string, int))");
    }
}
