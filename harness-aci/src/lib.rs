//! Contract call interface (ACI) model for the NFT harness.
//!
//! This crate describes what a compiled contract exposes and how values
//! cross the boundary:
//!
//! - [`ContractAci`] / [`FunctionAci`]: entry points read from compiler output
//! - [`TypeDesc`]: declared argument and return types
//! - [`Value`]: typed values, rendered as source literals or compiler JSON
//! - [`IntoValue`] / [`FromValue`]: conversions to and from Rust types
//!
//! ```
//! use harness_aci::{TypeDesc, Value};
//!
//! let ty = TypeDesc::parse("option(int)").unwrap();
//! let value = Value::some(Value::int(5));
//! assert!(value.conforms_to(&ty));
//! assert_eq!(value.to_literal(), "Some(5)");
//! ```

pub mod aci;
pub mod convert;
pub mod error;
mod literal;
pub mod types;
pub mod value;

pub use aci::{ArgumentAci, ContractAci, FunctionAci, INIT};
pub use convert::{FromValue, IntoValue};
pub use error::{AciError, AciResult};
pub use types::TypeDesc;
pub use value::Value;
