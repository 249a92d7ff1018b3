//! Clarity values, ABI model and typed contract interfaces
//!
//! Shared by the test provider and the `clarigen` CLI: the value codec used to
//! talk to `clarity-cli`, the ABI descriptors calls are checked against, the
//! transaction state machine and the typed interface generator.

pub mod abi;
pub mod c32;
pub mod codec;
pub mod error;
pub mod interface;
pub mod transaction;
pub mod types;
pub mod value;

pub use abi::{
    parse_json_abi, AbiArg, AbiFunction, AbiMap, AbiOutputs, AbiVariable, ClarityAbi, FunctionAccess, VariableAccess,
};
pub use codec::{decode_hex, deserialize, encode, serialize, serialize_hex};
pub use error::{ClarigenError, CodecError, Result};
pub use interface::{generate_interface, HostType, MethodKind, MethodSignature, ReturnShape, TypedInterface};
pub use transaction::{Receipt, SubmitOptions, Submitter, Transaction, TransactionResult, TxStatus};
pub use types::{ClarityType, TupleField};
pub use value::{ClarityValue, PrincipalData, StandardPrincipal};
