//! Host-value to Clarity-literal argument formatting
use clarigen_core::{encode, AbiFunction, ClarigenError, ClarityType, CodecError};
use serde_json::Value;

/// Encode and render one value; principals get the `'` literal prefix
pub fn format_value(raw: &Value, declared: &ClarityType) -> Result<String, CodecError> {
    let rendered = encode(raw, declared)?.render();
    if declared.is_principal() {
        Ok(format!("'{}", rendered))
    } else {
        Ok(rendered)
    }
}

/// Render `args` as Clarity literals, positionally typed by `func`'s arguments
pub fn format_arguments(func: &AbiFunction, args: &[Value]) -> Result<Vec<String>, ClarigenError> {
    if args.len() != func.arity() {
        return Err(ClarigenError::Arity {
            function: func.name.clone(),
            expected: func.arity(),
            actual: args.len(),
        });
    }

    args.iter()
        .zip(&func.args)
        .enumerate()
        .map(|(position, (raw, declared))| {
            format_value(raw, &declared.arg_type).map_err(|source| ClarigenError::TypeMismatch {
                function: func.name.clone(),
                position,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarigen_core::{AbiArg, AbiOutputs, FunctionAccess};
    use serde_json::json;

    const RECIPIENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    fn transfer() -> AbiFunction {
        AbiFunction {
            name: "transfer".to_string(),
            access: FunctionAccess::Public,
            args: vec![
                AbiArg {
                    name: "amount".to_string(),
                    arg_type: ClarityType::UInt,
                },
                AbiArg {
                    name: "to".to_string(),
                    arg_type: ClarityType::Principal,
                },
            ],
            outputs: AbiOutputs {
                output_type: ClarityType::Response {
                    ok: Box::new(ClarityType::Bool),
                    error: Box::new(ClarityType::UInt),
                },
            },
        }
    }

    #[test]
    fn test_transfer_arguments() {
        let formatted = format_arguments(&transfer(), &[json!(100), json!(RECIPIENT)]).unwrap();
        assert_eq!(formatted, vec!["u100".to_string(), format!("'{}", RECIPIENT)]);
    }

    #[test]
    fn test_contract_principal_prefixed() {
        let formatted =
            format_arguments(&transfer(), &[json!("5"), json!(format!("{}.vault", RECIPIENT))]).unwrap();
        assert_eq!(formatted[1], format!("'{}.vault", RECIPIENT));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = format_arguments(&transfer(), &[json!(100)]).unwrap_err();
        assert!(matches!(
            err,
            ClarigenError::Arity {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_type_mismatch_reports_position() {
        let err = format_arguments(&transfer(), &[json!(100), json!(true)]).unwrap_err();
        assert!(matches!(err, ClarigenError::TypeMismatch { position: 1, .. }));

        let err = format_arguments(&transfer(), &[json!("abc"), json!(RECIPIENT)]).unwrap_err();
        assert!(matches!(err, ClarigenError::TypeMismatch { position: 0, .. }));
    }
}
