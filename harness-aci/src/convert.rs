//! Conversions between Rust types and `Value`.

use crate::error::{AciError, AciResult};
use crate::types::TypeDesc;
use crate::value::Value;
use harness_primitives::{AccountAddress, ContractAddress};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Rust types that map onto a contract type.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Rust types that can be read back from a decoded result.
pub trait FromValue: Sized {
    /// The contract type this Rust type is read from.
    fn type_desc() -> TypeDesc;

    /// Converts a decoded value.
    ///
    /// # Errors
    ///
    /// Returns `AciError::Conversion` when the value has another shape or
    /// does not fit.
    fn from_value(value: Value) -> AciResult<Self>;
}

fn conversion<T>(value: &Value, target: &'static str) -> AciResult<T> {
    Err(AciError::Conversion {
        value: value.to_literal(),
        target,
    })
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn type_desc() -> TypeDesc {
        TypeDesc::Named("any".to_string())
    }

    fn from_value(value: Value) -> AciResult<Self> {
        Ok(value)
    }
}

macro_rules! int_conversions {
    ($($ty:ty => $to:ident),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(BigInt::from(self))
                }
            }

            impl FromValue for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Int
                }

                fn from_value(value: Value) -> AciResult<Self> {
                    match &value {
                        Value::Int(i) => match i.$to() {
                            Some(n) => Ok(n),
                            None => conversion(&value, stringify!($ty)),
                        },
                        _ => conversion(&value, stringify!($ty)),
                    }
                }
            }
        )*
    };
}

int_conversions!(u64 => to_u64, i64 => to_i64, u32 => to_u32, i128 => to_i128, u128 => to_u128);

impl IntoValue for BigInt {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl FromValue for BigInt {
    fn type_desc() -> TypeDesc {
        TypeDesc::Int
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => conversion(&other, "BigInt"),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn type_desc() -> TypeDesc {
        TypeDesc::Bool
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => conversion(&other, "bool"),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for String {
    fn type_desc() -> TypeDesc {
        TypeDesc::String
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => conversion(&other, "String"),
        }
    }
}

impl IntoValue for AccountAddress {
    fn into_value(self) -> Value {
        Value::Address(self)
    }
}

impl IntoValue for &AccountAddress {
    fn into_value(self) -> Value {
        Value::Address(*self)
    }
}

impl FromValue for AccountAddress {
    fn type_desc() -> TypeDesc {
        TypeDesc::Address
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Address(a) => Ok(a),
            other => conversion(&other, "AccountAddress"),
        }
    }
}

impl IntoValue for ContractAddress {
    fn into_value(self) -> Value {
        Value::Contract(self)
    }
}

impl FromValue for ContractAddress {
    fn type_desc() -> TypeDesc {
        TypeDesc::Named("contract".to_string())
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Contract(c) => Ok(c),
            other => conversion(&other, "ContractAddress"),
        }
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Unit
    }
}

impl FromValue for () {
    fn type_desc() -> TypeDesc {
        TypeDesc::Unit
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Unit => Ok(()),
            Value::Tuple(items) if items.is_empty() => Ok(()),
            other => conversion(&other, "()"),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => Value::some(v.into_value()),
            None => Value::none(),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::option(T::type_desc())
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => T::from_value(*inner).map(Some),
            other => conversion(&other, "Option"),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::list(T::type_desc())
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => conversion(&other, "Vec"),
        }
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn type_desc() -> TypeDesc {
        TypeDesc::Tuple(vec![A::type_desc(), B::type_desc()])
    }

    fn from_value(value: Value) -> AciResult<Self> {
        match value {
            Value::Tuple(items) if items.len() == 2 => {
                let mut iter = items.into_iter();
                match (iter.next(), iter.next()) {
                    (Some(a), Some(b)) => Ok((A::from_value(a)?, B::from_value(b)?)),
                    _ => Err(AciError::Conversion {
                        value: "tuple".to_string(),
                        target: "(A, B)",
                    }),
                }
            }
            other => conversion(&other, "(A, B)"),
        }
    }
}

/// Builds an argument list from heterogeneous Rust values.
///
/// ```
/// use harness_aci::{args, Value};
/// let list = args![7u64, true, "name"];
/// assert_eq!(list[0], Value::int(7u64));
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::IntoValue::into_value($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_roundtrip_and_overflow() {
        assert_eq!(u64::from_value(42u64.into_value()).unwrap(), 42);
        assert!(u64::from_value(Value::int(-1)).is_err());
        assert!(u32::from_value(Value::int(u64::MAX)).is_err());
    }

    #[test]
    fn option_of_address() {
        let addr = AccountAddress::from_bytes([4u8; 32]);
        let v = Some(addr).into_value();
        assert_eq!(Option::<AccountAddress>::from_value(v).unwrap(), Some(addr));
        assert_eq!(
            Option::<AccountAddress>::type_desc(),
            TypeDesc::option(TypeDesc::Address)
        );
    }

    #[test]
    fn wrong_shape_names_target() {
        let err = bool::from_value(Value::int(1)).unwrap_err();
        assert_eq!(
            err,
            AciError::Conversion {
                value: "1".into(),
                target: "bool"
            }
        );
    }
}
