//! Contract interface model read from the compiler's ACI JSON.
//!
//! The compiler returns a list of namespace and contract declarations. Only
//! the main contract is kept: the entry marked `contract_main`, or failing
//! that the last declaration that is not an interface.

use crate::error::{AciError, AciResult};
use crate::types::TypeDesc;
use crate::value::Value;
use serde_json::{json, Value as Json};
use std::collections::HashMap;

/// Name of the constructor entry point.
pub const INIT: &str = "init";

/// A declared entry point argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentAci {
    pub name: String,
    pub ty: TypeDesc,
}

/// A declared entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAci {
    pub name: String,
    pub arguments: Vec<ArgumentAci>,
    pub returns: TypeDesc,
    pub stateful: bool,
    pub payable: bool,
}

impl FunctionAci {
    /// Number of declared arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Checks argument count and that every value inhabits its declared type.
    ///
    /// # Errors
    ///
    /// `AciError::Arity` or `AciError::TypeMismatch` naming the argument.
    pub fn check_arguments(&self, args: &[Value]) -> AciResult<()> {
        if args.len() != self.arguments.len() {
            return Err(AciError::Arity {
                function: self.name.clone(),
                expected: self.arguments.len(),
                found: args.len(),
            });
        }
        for (decl, value) in self.arguments.iter().zip(args) {
            if !value.conforms_to(&decl.ty) {
                return Err(AciError::mismatch(
                    &decl.ty,
                    format!("{} for argument '{}' of {}", value.kind(), decl.name, self.name),
                ));
            }
        }
        Ok(())
    }

    fn from_json(json: &Json, typedefs: &HashMap<String, TypeDesc>) -> AciResult<Self> {
        let name = str_field(json, "name")?.to_string();
        let arguments = json
            .get("arguments")
            .and_then(Json::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|arg| {
                let ty = arg
                    .get("type")
                    .ok_or_else(|| AciError::invalid_aci(format!("argument of {name} has no type")))?;
                Ok(ArgumentAci {
                    name: str_field(arg, "name")?.to_string(),
                    ty: resolve(TypeDesc::from_aci_json(ty)?, typedefs),
                })
            })
            .collect::<AciResult<Vec<_>>>()?;
        let returns = match json.get("returns") {
            Some(ty) => resolve(TypeDesc::from_aci_json(ty)?, typedefs),
            None => TypeDesc::Unit,
        };
        Ok(Self {
            name,
            arguments,
            returns,
            stateful: json.get("stateful").and_then(Json::as_bool).unwrap_or(false),
            payable: json.get("payable").and_then(Json::as_bool).unwrap_or(false),
        })
    }

    fn to_json(&self) -> Json {
        json!({
            "name": self.name,
            "arguments": self
                .arguments
                .iter()
                .map(|a| json!({ "name": a.name, "type": a.ty.to_aci_json() }))
                .collect::<Vec<_>>(),
            "returns": self.returns.to_aci_json(),
            "stateful": self.stateful,
            "payable": self.payable,
        })
    }
}

/// Interface of the main contract in a compiled source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAci {
    pub name: String,
    pub functions: Vec<FunctionAci>,
}

impl ContractAci {
    /// Reads the compiler's ACI output.
    ///
    /// Accepts either the full declaration list or a single
    /// `{"contract": {...}}` object.
    ///
    /// # Errors
    ///
    /// Returns `AciError::InvalidAci` when no contract is declared or a
    /// declaration is malformed.
    pub fn from_json(json: &Json) -> AciResult<Self> {
        let decls: Vec<&Json> = match json {
            Json::Array(items) => items.iter().collect(),
            Json::Object(_) => vec![json],
            other => return Err(AciError::invalid_aci(format!("expected a list, got {other}"))),
        };

        let contracts: Vec<&Json> = decls.iter().filter_map(|d| d.get("contract")).collect();
        let main = contracts
            .iter()
            .find(|c| c.get("kind").and_then(Json::as_str) == Some("contract_main"))
            .or_else(|| {
                contracts.iter().rev().find(|c| {
                    let kind = c.get("kind").and_then(Json::as_str);
                    let is_interface = kind == Some("contract_interface")
                        || c.get("is_interface").and_then(Json::as_bool) == Some(true);
                    !is_interface
                })
            })
            .ok_or_else(|| AciError::invalid_aci("no contract declaration"))?;

        let name = str_field(main, "name")?.to_string();
        let typedefs = typedefs(main, &name)?;
        let functions = main
            .get("functions")
            .and_then(Json::as_array)
            .ok_or_else(|| AciError::invalid_aci(format!("contract {name} lists no functions")))?
            .iter()
            .map(|f| FunctionAci::from_json(f, &typedefs))
            .collect::<AciResult<Vec<_>>>()?;

        Ok(Self { name, functions })
    }

    /// Renders the declaration list as the compiler emits it.
    #[must_use]
    pub fn to_json(&self) -> Json {
        json!([{
            "contract": {
                "name": self.name,
                "kind": "contract_main",
                "payable": false,
                "typedefs": [],
                "functions": self.functions.iter().map(FunctionAci::to_json).collect::<Vec<_>>(),
            }
        }])
    }

    /// Looks up an entry point by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionAci> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Looks up an entry point, failing with `AciError::UnknownFunction`.
    ///
    /// # Errors
    ///
    /// When the contract does not declare `name`.
    pub fn require(&self, name: &str) -> AciResult<&FunctionAci> {
        self.function(name).ok_or_else(|| AciError::UnknownFunction {
            contract: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// The constructor, if declared.
    #[must_use]
    pub fn init(&self) -> Option<&FunctionAci> {
        self.function(INIT)
    }

    /// Whether `name` is declared with exactly `arity` arguments.
    #[must_use]
    pub fn has_function(&self, name: &str, arity: usize) -> bool {
        self.function(name).is_some_and(|f| f.arity() == arity)
    }
}

fn str_field<'a>(json: &'a Json, field: &str) -> AciResult<&'a str> {
    json.get(field)
        .and_then(Json::as_str)
        .ok_or_else(|| AciError::invalid_aci(format!("missing '{field}'")))
}

fn typedefs(contract: &Json, contract_name: &str) -> AciResult<HashMap<String, TypeDesc>> {
    let mut defs = HashMap::new();
    let Some(list) = contract.get("typedefs").and_then(Json::as_array) else {
        return Ok(defs);
    };
    for def in list {
        let name = str_field(def, "name")?;
        let body = def
            .get("typedef")
            .ok_or_else(|| AciError::invalid_aci(format!("typedef {name} has no body")))?;
        let ty = TypeDesc::from_aci_json(body)?;
        defs.insert(format!("{contract_name}.{name}"), ty.clone());
        defs.insert(name.to_string(), ty);
    }
    Ok(defs)
}

// typedefs may reference earlier typedefs; depth is bounded by the table size
fn resolve(ty: TypeDesc, defs: &HashMap<String, TypeDesc>) -> TypeDesc {
    resolve_depth(ty, defs, defs.len())
}

fn resolve_depth(ty: TypeDesc, defs: &HashMap<String, TypeDesc>, depth: usize) -> TypeDesc {
    let next = |t: TypeDesc| resolve_depth(t, defs, depth);
    match ty {
        TypeDesc::Named(name) => match defs.get(&name) {
            Some(def) if depth > 0 => resolve_depth(def.clone(), defs, depth - 1),
            _ => TypeDesc::Named(name),
        },
        TypeDesc::Option(inner) => TypeDesc::option(next(*inner)),
        TypeDesc::List(inner) => TypeDesc::list(next(*inner)),
        TypeDesc::Map(k, v) => TypeDesc::map(next(*k), next(*v)),
        TypeDesc::Tuple(items) => TypeDesc::Tuple(items.into_iter().map(next).collect()),
        TypeDesc::Record(fields) => {
            TypeDesc::Record(fields.into_iter().map(|(n, t)| (n, next(t))).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Json {
        json!([
            { "namespace": { "name": "ListInternal", "typedefs": [] } },
            { "contract": {
                "name": "NFTReceiver",
                "kind": "contract_interface",
                "functions": [
                    { "name": "on_nft_received", "arguments": [], "returns": "bool", "stateful": false, "payable": false }
                ]
            } },
            { "contract": {
                "name": "NFT",
                "kind": "contract_main",
                "payable": false,
                "typedefs": [
                    { "name": "owners", "typedef": { "map": ["int", "address"] }, "vars": [] }
                ],
                "functions": [
                    { "name": "init", "arguments": [
                        { "name": "name", "type": "string" },
                        { "name": "symbol", "type": "string" }
                    ], "returns": "NFT.state", "stateful": false, "payable": false },
                    { "name": "mint", "arguments": [
                        { "name": "to", "type": "address" },
                        { "name": "token_id", "type": "int" }
                    ], "returns": { "tuple": [] }, "stateful": true, "payable": false },
                    { "name": "all_owners", "arguments": [], "returns": "NFT.owners", "stateful": false, "payable": false }
                ]
            } }
        ])
    }

    #[test]
    fn picks_main_contract_over_interfaces() {
        let aci = ContractAci::from_json(&sample()).unwrap();
        assert_eq!(aci.name, "NFT");
        assert_eq!(aci.functions.len(), 3);
        assert!(aci.init().is_some());
        assert!(aci.function("on_nft_received").is_none());
    }

    #[test]
    fn reads_flags_and_resolves_typedefs() {
        let aci = ContractAci::from_json(&sample()).unwrap();
        let mint = aci.function("mint").unwrap();
        assert!(mint.stateful);
        assert_eq!(mint.returns, TypeDesc::Unit);
        assert_eq!(
            aci.function("all_owners").unwrap().returns,
            TypeDesc::map(TypeDesc::Int, TypeDesc::Address)
        );
    }

    #[test]
    fn last_non_interface_without_main_marker() {
        let json = json!([
            { "contract": { "name": "A", "functions": [] } },
            { "contract": { "name": "I", "kind": "contract_interface", "functions": [] } }
        ]);
        assert_eq!(ContractAci::from_json(&json).unwrap().name, "A");
    }

    #[test]
    fn argument_checks() {
        let aci = ContractAci::from_json(&sample()).unwrap();
        let mint = aci.require("mint").unwrap();
        let owner = harness_primitives::AccountAddress::from_bytes([9u8; 32]);

        assert!(mint
            .check_arguments(&[Value::Address(owner), Value::int(0)])
            .is_ok());
        assert!(matches!(
            mint.check_arguments(&[Value::Address(owner)]),
            Err(AciError::Arity { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            mint.check_arguments(&[Value::int(0), Value::int(0)]),
            Err(AciError::TypeMismatch { .. })
        ));
        assert!(matches!(
            aci.require("steal"),
            Err(AciError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn json_rendering_reads_back() {
        let aci = ContractAci::from_json(&sample()).unwrap();
        assert_eq!(ContractAci::from_json(&aci.to_json()).unwrap(), aci);
    }
}
