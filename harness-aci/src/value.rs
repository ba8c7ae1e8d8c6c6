//! Typed contract values.
//!
//! Values travel three ways: as source literals inside calldata requests to
//! the compiler, as JSON in decoded call results, and serialized directly by
//! the devnet.

use crate::error::{AciError, AciResult};
use crate::types::{tagged, TypeDesc};
use harness_primitives::{AccountAddress, ContractAddress};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::fmt;

/// A value of some contract-level type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Int(BigInt),
    Bool(bool),
    String(String),
    Address(AccountAddress),
    Contract(ContractAddress),
    Bytes(Vec<u8>),
    Unit,
    Option(Option<Box<Value>>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Integer value.
    #[must_use]
    pub fn int<I: Into<BigInt>>(i: I) -> Self {
        Self::Int(i.into())
    }

    /// `Some(value)`.
    #[must_use]
    pub fn some(value: Value) -> Self {
        Self::Option(Some(Box::new(value)))
    }

    /// `None`.
    #[must_use]
    pub const fn none() -> Self {
        Self::Option(None)
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Address(_) => "address",
            Self::Contract(_) => "contract",
            Self::Bytes(_) => "bytes",
            Self::Unit => "unit",
            Self::Option(_) => "option",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }

    /// Whether this value inhabits `ty`.
    #[must_use]
    pub fn conforms_to(&self, ty: &TypeDesc) -> bool {
        match (ty, self) {
            (TypeDesc::Int, Self::Int(_))
            | (TypeDesc::Bool, Self::Bool(_))
            | (TypeDesc::String, Self::String(_))
            | (TypeDesc::Address, Self::Address(_))
            | (TypeDesc::Unit, Self::Unit)
            | (TypeDesc::Bytes(None), Self::Bytes(_))
            | (TypeDesc::Option(_), Self::Option(None))
            | (TypeDesc::Named(_), Self::Contract(_) | Self::Record(_)) => true,
            (TypeDesc::Unit, Self::Tuple(items)) => items.is_empty(),
            (TypeDesc::Bytes(Some(n)), Self::Bytes(b)) => b.len() == *n,
            (TypeDesc::Option(inner), Self::Option(Some(v))) => v.conforms_to(inner),
            (TypeDesc::List(inner), Self::List(items)) => {
                items.iter().all(|item| item.conforms_to(inner))
            }
            (TypeDesc::Tuple(types), Self::Tuple(items)) => {
                types.len() == items.len()
                    && types.iter().zip(items).all(|(t, v)| v.conforms_to(t))
            }
            (TypeDesc::Map(kt, vt), Self::Map(pairs)) => pairs
                .iter()
                .all(|(k, v)| k.conforms_to(kt) && v.conforms_to(vt)),
            (TypeDesc::Record(fields), Self::Record(values)) => {
                fields.len() == values.len()
                    && fields.iter().all(|(name, ft)| {
                        values
                            .iter()
                            .any(|(vn, v)| vn == name && v.conforms_to(ft))
                    })
            }
            _ => false,
        }
    }

    /// Source-language literal, as the compiler's calldata endpoint expects.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::String(s) => quote(s),
            Self::Address(a) => a.to_string(),
            Self::Contract(c) => c.to_string(),
            Self::Bytes(b) => format!("#{}", hex::encode(b)),
            Self::Unit => "()".to_string(),
            Self::Option(None) => "None".to_string(),
            Self::Option(Some(v)) => format!("Some({})", v.to_literal()),
            Self::List(items) => format!("[{}]", join(items.iter().map(Self::to_literal))),
            Self::Tuple(items) => format!("({})", join(items.iter().map(Self::to_literal))),
            Self::Map(pairs) => format!(
                "{{{}}}",
                join(
                    pairs
                        .iter()
                        .map(|(k, v)| format!("[{}] = {}", k.to_literal(), v.to_literal()))
                )
            ),
            Self::Record(fields) => format!(
                "{{{}}}",
                join(
                    fields
                        .iter()
                        .map(|(name, v)| format!("{name} = {}", v.to_literal()))
                )
            ),
        }
    }

    /// JSON in the shape the compiler returns for decoded results.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Int(i) => i
                .to_i64()
                .map_or_else(|| json!(i.to_string()), |n| json!(n)),
            Self::Bool(b) => json!(b),
            Self::String(s) => json!(s),
            Self::Address(a) => json!(a.to_string()),
            Self::Contract(c) => json!(c.to_string()),
            Self::Bytes(b) => json!(format!("#{}", hex::encode(b))),
            Self::Unit => json!([]),
            Self::Option(None) => json!("None"),
            Self::Option(Some(v)) => tagged("Some", json!([v.to_json()])),
            Self::List(items) | Self::Tuple(items) => {
                Json::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Map(pairs) => Json::Array(
                pairs
                    .iter()
                    .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                    .collect(),
            ),
            Self::Record(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Decodes compiler JSON according to the declared type.
    ///
    /// # Errors
    ///
    /// Returns `AciError::TypeMismatch` when the JSON does not fit `ty`, and
    /// `AciError::Unresolved` for typedef names.
    pub fn from_json(ty: &TypeDesc, json: &Json) -> AciResult<Self> {
        match (ty, json) {
            (TypeDesc::Int, Json::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::int(u))
                } else {
                    // large integers may lose precision as floats; accept only integral ones
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .and_then(|f| format!("{f:.0}").parse::<BigInt>().ok())
                        .map(Self::Int)
                        .ok_or_else(|| AciError::mismatch(ty, n.to_string()))
                }
            }
            (TypeDesc::Int, Json::String(s)) => s
                .parse::<BigInt>()
                .map(Self::Int)
                .map_err(|_| AciError::mismatch(ty, format!("string '{s}'"))),
            (TypeDesc::Bool, Json::Bool(b)) => Ok(Self::Bool(*b)),
            (TypeDesc::String, Json::String(s)) => Ok(Self::String(s.clone())),
            (TypeDesc::Address, Json::String(s)) => s
                .parse::<AccountAddress>()
                .map(Self::Address)
                .map_err(|e| AciError::mismatch(ty, e.to_string())),
            (TypeDesc::Bytes(size), Json::String(s)) => {
                let bytes = hex::decode(s.trim_start_matches('#'))
                    .map_err(|e| AciError::mismatch(ty, e.to_string()))?;
                match size {
                    Some(n) if bytes.len() != *n => {
                        Err(AciError::mismatch(ty, format!("{} bytes", bytes.len())))
                    }
                    _ => Ok(Self::Bytes(bytes)),
                }
            }
            (TypeDesc::Unit, Json::Array(items)) if items.is_empty() => Ok(Self::Unit),
            (TypeDesc::Unit, Json::Null) => Ok(Self::Unit),
            (TypeDesc::Option(_), Json::Null) => Ok(Self::none()),
            (TypeDesc::Option(_), Json::String(s)) if s == "None" => Ok(Self::none()),
            (TypeDesc::Option(inner), Json::Object(obj)) => {
                if obj.contains_key("None") {
                    return Ok(Self::none());
                }
                let payload = obj
                    .get("Some")
                    .and_then(Json::as_array)
                    .and_then(|items| items.first())
                    .ok_or_else(|| AciError::mismatch(ty, "object without Some/None"))?;
                Ok(Self::some(Self::from_json(inner, payload)?))
            }
            (TypeDesc::List(inner), Json::Array(items)) => items
                .iter()
                .map(|item| Self::from_json(inner, item))
                .collect::<AciResult<Vec<_>>>()
                .map(Self::List),
            (TypeDesc::Tuple(types), Json::Array(items)) => {
                if types.len() != items.len() {
                    return Err(AciError::mismatch(ty, format!("{} elements", items.len())));
                }
                types
                    .iter()
                    .zip(items)
                    .map(|(t, item)| Self::from_json(t, item))
                    .collect::<AciResult<Vec<_>>>()
                    .map(Self::Tuple)
            }
            (TypeDesc::Map(kt, vt), Json::Array(pairs)) => pairs
                .iter()
                .map(|pair| match pair.as_array().map(Vec::as_slice) {
                    Some([k, v]) => Ok((Self::from_json(kt, k)?, Self::from_json(vt, v)?)),
                    _ => Err(AciError::mismatch(ty, "map entry that is not a pair")),
                })
                .collect::<AciResult<Vec<_>>>()
                .map(Self::Map),
            (TypeDesc::Map(kt, vt), Json::Object(obj)) if **kt == TypeDesc::String => obj
                .iter()
                .map(|(k, v)| Ok((Self::String(k.clone()), Self::from_json(vt, v)?)))
                .collect::<AciResult<Vec<_>>>()
                .map(Self::Map),
            (TypeDesc::Record(fields), Json::Object(obj)) => fields
                .iter()
                .map(|(name, ft)| {
                    let raw = obj
                        .get(name)
                        .ok_or_else(|| AciError::mismatch(ty, format!("missing field '{name}'")))?;
                    Ok((name.clone(), Self::from_json(ft, raw)?))
                })
                .collect::<AciResult<Vec<_>>>()
                .map(Self::Record),
            (TypeDesc::Named(_), Json::String(s)) if s.starts_with("ct_") => s
                .parse::<ContractAddress>()
                .map(Self::Contract)
                .map_err(|e| AciError::mismatch(ty, e.to_string())),
            (TypeDesc::Named(name), _) => Err(AciError::Unresolved { name: name.clone() }),
            (_, other) => Err(AciError::mismatch(ty, describe(other))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

fn describe(json: &Json) -> String {
    match json {
        Json::Null => "null".to_string(),
        Json::Bool(b) => format!("bool {b}"),
        Json::Number(n) => format!("number {n}"),
        Json::String(s) => format!("string '{s}'"),
        Json::Array(items) => format!("array of {}", items.len()),
        Json::Object(_) => "object".to_string(),
    }
}

fn join<I: Iterator<Item = String>>(items: I) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountAddress {
        AccountAddress::from_bytes([1u8; 32])
    }

    #[test]
    fn literals_match_source_syntax() {
        assert_eq!(Value::int(-42).to_literal(), "-42");
        assert_eq!(
            Value::String("say \"hi\"".into()).to_literal(),
            r#""say \"hi\"""#
        );
        assert_eq!(Value::some(Value::Bool(true)).to_literal(), "Some(true)");
        assert_eq!(Value::none().to_literal(), "None");
        assert_eq!(
            Value::Map(vec![(Value::int(1), Value::String("a".into()))]).to_literal(),
            r#"{[1] = "a"}"#
        );
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_literal(), "#dead");
        assert_eq!(
            Value::Address(owner()).to_literal(),
            owner().to_string()
        );
    }

    #[test]
    fn decode_option_in_both_encodings() {
        let ty = TypeDesc::option(TypeDesc::Address);
        let some = json!({ "Some": [owner().to_string()] });
        assert_eq!(
            Value::from_json(&ty, &some).unwrap(),
            Value::some(Value::Address(owner()))
        );
        assert_eq!(Value::from_json(&ty, &json!("None")).unwrap(), Value::none());
        assert_eq!(Value::from_json(&ty, &json!({ "None": [] })).unwrap(), Value::none());
    }

    #[test]
    fn decode_big_int_from_string() {
        let big = "123456789012345678901234567890";
        let value = Value::from_json(&TypeDesc::Int, &json!(big)).unwrap();
        assert_eq!(value.to_literal(), big);
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let err = Value::from_json(&TypeDesc::Bool, &json!(1)).unwrap_err();
        assert_eq!(
            err,
            AciError::TypeMismatch {
                expected: "bool".into(),
                found: "number 1".into()
            }
        );
    }

    #[test]
    fn json_and_back_through_type() {
        let ty = TypeDesc::map(
            TypeDesc::Address,
            TypeDesc::Tuple(vec![TypeDesc::Int, TypeDesc::list(TypeDesc::Bool)]),
        );
        let value = Value::Map(vec![(
            Value::Address(owner()),
            Value::Tuple(vec![
                Value::int(3),
                Value::List(vec![Value::Bool(true), Value::Bool(false)]),
            ]),
        )]);
        assert!(value.conforms_to(&ty));
        assert_eq!(Value::from_json(&ty, &value.to_json()).unwrap(), value);
    }

    #[test]
    fn conformance_checks_nested_types() {
        let ty = TypeDesc::list(TypeDesc::Int);
        assert!(Value::List(vec![Value::int(1)]).conforms_to(&ty));
        assert!(!Value::List(vec![Value::Bool(true)]).conforms_to(&ty));
        assert!(!Value::Bytes(vec![0; 31]).conforms_to(&TypeDesc::Bytes(Some(32))));
        assert!(Value::Unit.conforms_to(&TypeDesc::Unit));
    }
}
