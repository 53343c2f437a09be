use crate::support::{exit_with_error, flush_notices};
use serde::Serialize;
use stmtfx_decl::{DeclarationParser, InputSpec};
use stmtfx_kernel::{CHECK_KIND, CheckReport, Diagnostics, FxError, Notice, OperationSummary};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckPayload<'a> {
    check_kind: &'static str,
    result: &'static str,
    input_files: &'a [PathBuf],
    operations: &'a [OperationSummary],
    notices: &'a [Notice],
    error: Option<String>,
}

fn payload<'a>(
    result: &'a Result<CheckReport, FxError>,
    notices: &'a [Notice],
) -> CheckPayload<'a> {
    match result {
        Ok(report) => CheckPayload {
            check_kind: CHECK_KIND,
            result: "accepted",
            input_files: &report.input_files,
            operations: &report.operations,
            notices,
            error: None,
        },
        Err(err) => CheckPayload {
            check_kind: CHECK_KIND,
            result: "rejected",
            input_files: &[],
            operations: &[],
            notices,
            error: Some(err.to_string()),
        },
    }
}

pub fn run(inputs: InputSpec, prefix: String, json_output: bool) {
    let mut diagnostics = Diagnostics::new();
    let result = stmtfx_kernel::check(&inputs, &DeclarationParser, &prefix, &mut diagnostics);

    if json_output {
        let payload = payload(&result, diagnostics.notices());
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
        if let Err(err) = &result {
            exit_with_error(err);
        }
        return;
    }

    flush_notices(&diagnostics);
    let report = match result {
        Ok(report) => report,
        Err(err) => exit_with_error(&err),
    };

    println!("stmtfx merge check");
    println!("  Inputs: {}", report.input_files.len());
    println!("  Operations: {}", report.operations.len());
    for operation in &report.operations {
        println!(
            "    - {} -> {}() [{}, {} variant(s)]",
            operation.name,
            operation.method,
            operation.kind.execute_method(),
            operation.variants
        );
    }
    println!("  Notices: {}", diagnostics.notices().len());
    println!("  Result: accepted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejected_payload_carries_error_and_notices() {
        let result: Result<CheckReport, FxError> =
            Err(FxError::Usage("Missing input files".to_string()));
        let value = serde_json::to_value(payload(&result, &[])).expect("payload serializes");
        assert_eq!(
            value,
            json!({
                "checkKind": CHECK_KIND,
                "result": "rejected",
                "inputFiles": [],
                "operations": [],
                "notices": [],
                "error": "Missing input files",
            })
        );
    }

    #[test]
    fn accepted_payload_lists_operations() {
        let result: Result<CheckReport, FxError> = Ok(CheckReport {
            check_kind: CHECK_KIND.to_string(),
            input_files: vec![PathBuf::from("a.sql")],
            operations: vec![OperationSummary {
                name: "getUser".to_string(),
                method: "getuser".to_string(),
                kind: stmtfx_kernel::OperationKind::Select,
                parameters: vec!["id".to_string()],
                variants: 1,
            }],
        });
        let value = serde_json::to_value(payload(&result, &[])).expect("payload serializes");
        assert_eq!(value["result"], "accepted");
        assert_eq!(value["error"], serde_json::Value::Null);
        assert_eq!(value["operations"][0]["kind"], "select");
        assert_eq!(value["operations"][0]["parameters"], json!(["id"]));
    }
}
