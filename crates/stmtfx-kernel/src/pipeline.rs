//! End-to-end runs: resolve inputs, parse, merge, render, write.

use crate::aggregate::Aggregator;
use crate::classify::OperationKind;
use crate::diagnostics::Diagnostics;
use crate::emit::render;
use crate::error::FxError;
use crate::merge::{Contract, merge};
use crate::options::{EmitOptions, OutputName};
use serde::Serialize;
use stmtfx_decl::{InputSpec, StatementSource, resolve_inputs};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub const CHECK_KIND: &str = "stmtfx.merge_check.v1";

/// Everything `run` needs to produce one artifact.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Existing directory the artifact path is resolved against.
    pub output_dir: PathBuf,
    /// Raw namespaced output name, validated by `run`.
    pub output_name: String,
    pub inputs: InputSpec,
    pub options: EmitOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub output_path: PathBuf,
    pub input_files: Vec<PathBuf>,
    pub operations: usize,
    pub bytes: usize,
}

/// Summary of one merged operation, as reported by `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub name: String,
    pub method: String,
    pub kind: OperationKind,
    pub parameters: Vec<String>,
    pub variants: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub check_kind: String,
    pub input_files: Vec<PathBuf>,
    pub operations: Vec<OperationSummary>,
}

/// Generate the artifact described by `request`.
///
/// Nothing is written unless every input parses and merges cleanly. Notices
/// recorded before a failure remain in `diagnostics`.
pub fn run<S: StatementSource + ?Sized>(
    request: &GenerateRequest,
    source: &S,
    diagnostics: &mut Diagnostics,
) -> Result<RunReport, FxError> {
    let name = OutputName::parse(&request.output_name).map_err(FxError::Usage)?;
    let output_dir = resolve_output_dir(&request.output_dir)?;
    let input_files = resolve_inputs(&request.inputs)?;

    let contract = build_contract(&input_files, source, &request.options.prefix, diagnostics)?;
    let rendered = render(&contract, &input_files, &name, &request.options);

    let output_path = output_dir.join(name.relative_path());
    write_artifact(&output_path, rendered.as_bytes())?;
    info!(
        path = %output_path.display(),
        operations = contract.operations.len(),
        bytes = rendered.len(),
        "Wrote query interface."
    );

    Ok(RunReport {
        output_path,
        input_files,
        operations: contract.operations.len(),
        bytes: rendered.len(),
    })
}

/// Parse and merge `inputs` without rendering or writing anything.
pub fn check<S: StatementSource + ?Sized>(
    inputs: &InputSpec,
    source: &S,
    prefix: &str,
    diagnostics: &mut Diagnostics,
) -> Result<CheckReport, FxError> {
    let input_files = resolve_inputs(inputs)?;
    let contract = build_contract(&input_files, source, prefix, diagnostics)?;

    let operations = contract
        .operations
        .into_iter()
        .map(|operation| OperationSummary {
            parameters: operation
                .parameters
                .names()
                .map(str::to_string)
                .collect(),
            variants: operation.provenance.len(),
            name: operation.name,
            method: operation.method,
            kind: operation.kind,
        })
        .collect();

    Ok(CheckReport {
        check_kind: CHECK_KIND.to_string(),
        input_files,
        operations,
    })
}

fn build_contract<S: StatementSource + ?Sized>(
    input_files: &[PathBuf],
    source: &S,
    prefix: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Contract, FxError> {
    let mut aggregator = Aggregator::new();
    for file in input_files {
        let records = source.parse_file(file)?;
        debug!(
            file = %file.display(),
            statements = records.len(),
            "Parsed declaration file."
        );
        aggregator.add_file(records);
    }

    let entries = aggregator.finish();
    Ok(merge(&entries, prefix, diagnostics)?)
}

fn resolve_output_dir(dir: &Path) -> Result<PathBuf, FxError> {
    if !dir.is_dir() {
        return Err(FxError::Usage(format!("{}: No such directory", dir.display())));
    }
    fs::canonicalize(dir).map_err(|e| FxError::Usage(format!("{}: {e}", dir.display())))
}

// Written to a sibling temp file and renamed into place, so a failed write
// never leaves a truncated artifact behind.
fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), FxError> {
    let output_error = |path: &Path, e: std::io::Error| FxError::Output {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), FxError> {
        let mut file = File::create(&tmp_path).map_err(|e| output_error(&tmp_path, e))?;
        file.write_all(bytes).map_err(|e| output_error(&tmp_path, e))?;
        file.sync_all().map_err(|e| output_error(&tmp_path, e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        output_error(path, e)
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "Renamed artifact into place.");
    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stmtfx_decl::{DeclError, ScalarType, StatementRecord, VariableDecl};
    use std::collections::HashMap;

    /// Serves canned records instead of reading files.
    struct FixtureSource {
        files: HashMap<PathBuf, Vec<StatementRecord>>,
    }

    impl StatementSource for FixtureSource {
        fn parse_file(&self, path: &Path) -> Result<Vec<StatementRecord>, DeclError> {
            self.files.get(path).cloned().ok_or_else(|| DeclError::Parse {
                path: path.to_path_buf(),
                line: 1,
                message: "unexpected file".to_string(),
            })
        }
    }

    fn fixture(dir: &Path, id_type: ScalarType) -> (FixtureSource, Vec<PathBuf>) {
        let a = dir.join("a.sql");
        let b = dir.join("b.sql");
        fs::write(&a, "").expect("write a.sql");
        fs::write(&b, "").expect("write b.sql");
        let files = HashMap::from([
            (
                a.clone(),
                vec![
                    StatementRecord::new("getUser", "SELECT * FROM u WHERE id = :id", &a, 2)
                        .with_variable("id", VariableDecl::required(ScalarType::Int)),
                ],
            ),
            (
                b.clone(),
                vec![
                    StatementRecord::new("getUser", "SELECT * FROM u WHERE id = :id", &b, 4)
                        .with_variable("id", VariableDecl::required(id_type)),
                ],
            ),
        ]);
        (FixtureSource { files }, vec![a, b])
    }

    #[test]
    fn run_writes_artifact_below_namespace_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (source, inputs) = fixture(dir.path(), ScalarType::Int);
        let request = GenerateRequest {
            output_dir: dir.path().to_path_buf(),
            output_name: "App.Db.Queries".to_string(),
            inputs: InputSpec::Files(inputs.clone()),
            options: EmitOptions::default(),
        };

        let mut diagnostics = Diagnostics::new();
        let report = run(&request, &source, &mut diagnostics).expect("run should succeed");

        let expected = fs::canonicalize(dir.path())
            .expect("canonical tempdir")
            .join("App")
            .join("Db")
            .join("Queries.php");
        assert_eq!(report.output_path, expected);
        assert_eq!(report.input_files, inputs);
        assert_eq!(report.operations, 1);
        let written = fs::read_to_string(&expected).expect("artifact exists");
        assert_eq!(written.len(), report.bytes);
        assert!(written.contains("public function getuser(int $id) : Generator {"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn conflict_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (source, inputs) = fixture(dir.path(), ScalarType::String);
        let request = GenerateRequest {
            output_dir: dir.path().to_path_buf(),
            output_name: "Queries".to_string(),
            inputs: InputSpec::Files(inputs),
            options: EmitOptions::default(),
        };

        let err = run(&request, &source, &mut Diagnostics::new()).unwrap_err();
        assert!(matches!(err, FxError::Conflict(_)));
        assert!(!dir.path().join("Queries.php").exists());
    }

    #[test]
    fn invalid_output_name_and_missing_dir_are_usage_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (source, inputs) = fixture(dir.path(), ScalarType::Int);
        let mut request = GenerateRequest {
            output_dir: dir.path().to_path_buf(),
            output_name: "1Bad".to_string(),
            inputs: InputSpec::Files(inputs),
            options: EmitOptions::default(),
        };
        let err = run(&request, &source, &mut Diagnostics::new()).unwrap_err();
        assert_eq!(err.to_string(), "1Bad: Invalid FQN");
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);

        request.output_name = "Queries".to_string();
        request.output_dir = dir.path().join("missing");
        let err = run(&request, &source, &mut Diagnostics::new()).unwrap_err();
        assert!(matches!(err, FxError::Usage(ref message) if message.ends_with("No such directory")));
    }

    #[test]
    fn check_summarises_operations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (source, inputs) = fixture(dir.path(), ScalarType::Int);
        let report = check(
            &InputSpec::Files(inputs),
            &source,
            "get",
            &mut Diagnostics::new(),
        )
        .expect("check should succeed");
        assert_eq!(report.check_kind, CHECK_KIND);
        assert_eq!(
            report.operations,
            vec![OperationSummary {
                name: "getUser".to_string(),
                method: "user".to_string(),
                kind: OperationKind::Select,
                parameters: vec!["id".to_string()],
                variants: 2,
            }]
        );
    }

    #[test]
    fn parse_failures_surface_as_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stray = dir.path().join("stray.sql");
        fs::write(&stray, "").expect("write stray");
        let source = FixtureSource {
            files: HashMap::new(),
        };
        let err = check(
            &InputSpec::Files(vec![stray]),
            &source,
            "",
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(matches!(err, FxError::Parse(_)));
        assert_eq!(err.exit_code(), crate::error::EXIT_FAILURE);
    }
}
