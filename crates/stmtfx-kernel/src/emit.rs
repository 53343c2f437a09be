//! Render a merged contract as a PHP query interface.
//!
//! Every operation becomes one method that forwards its parameters to the
//! runtime's data connector and resolves to the connector's result: rows
//! for selects, the generated id for inserts and the affected-row count
//! for everything else.

use crate::merge::{Contract, MergedOperation};
use crate::options::{EmitOptions, OutputName};
use crate::reconcile::ReconciledParameter;
use stmtfx_decl::{DefaultValue, ScalarType, VariableDecl};
use std::path::PathBuf;

const GENERATOR_NAME: &str = "stmtfx";
const RETURN_PREFIX: &str = "Generator<mixed, 'all'|'once'|'race'|'reject'|'resolve'|array{'resolve'}|Generator<mixed, mixed, mixed, mixed>|null, mixed, ";

struct Lines {
    out: String,
    eol: &'static str,
}

impl Lines {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str(self.eol);
    }

    fn blank(&mut self) {
        self.out.push_str(self.eol);
    }
}

/// Render the whole artifact. `sources` are the input files in the order
/// they were read.
pub fn render(
    contract: &Contract,
    sources: &[PathBuf],
    name: &OutputName,
    options: &EmitOptions,
) -> String {
    let indent = options.indent.render();
    let mut lines = Lines {
        out: String::new(),
        eol: options.line_ending.as_str(),
    };

    let basenames: Vec<String> = sources
        .iter()
        .map(|path| match path.file_name() {
            Some(file_name) => file_name.to_string_lossy().into_owned(),
            None => path.display().to_string(),
        })
        .collect();

    lines.line("<?php");
    lines.blank();
    lines.line("/*");
    lines.line(&format!(" * Auto-generated by {GENERATOR_NAME}"));
    lines.line(&format!(" * Created from {}", basenames.join(", ")));
    lines.line(" */");
    lines.blank();
    lines.line("declare(strict_types=1);");
    lines.blank();
    if let Some(namespace) = name.namespace() {
        lines.line(&format!("namespace {namespace};"));
        lines.blank();
    }
    lines.line("use Generator;");
    lines.line("use poggit\\libasynql\\DataConnector;");
    lines.line("use SOFe\\AwaitGenerator\\Await;");
    lines.blank();
    lines.line(&format!(
        "{} {}{{",
        options.structure.keyword(),
        name.container()
    ));
    lines.line(&format!(
        "{indent}public function __construct(private DataConnector $conn) {{}}"
    ));
    for operation in &contract.operations {
        render_operation(&mut lines, operation, &indent);
    }
    lines.line("}");

    lines.out
}

fn render_operation(lines: &mut Lines, operation: &MergedOperation, indent: &str) {
    lines.blank();
    lines.line(&format!("{indent}/**"));
    for doc_line in doc_lines(operation) {
        let doc_line = escape_comment(&doc_line);
        if doc_line.is_empty() {
            lines.line(&format!("{indent} *"));
        } else {
            lines.line(&format!("{indent} * {doc_line}"));
        }
    }
    lines.line(&format!("{indent} */"));

    let parameters = &operation.parameters.parameters;
    let signature: Vec<String> = parameters.iter().map(signature_parameter).collect();
    let arguments: Vec<String> = parameters
        .iter()
        .map(|parameter| format!("\"{0}\" => ${0}", parameter.name))
        .collect();

    lines.line(&format!(
        "{indent}public function {}({}) : Generator {{",
        operation.method,
        signature.join(", ")
    ));
    lines.line(&format!(
        "{indent}{indent}$this->conn->{}({}, [{}], yield Await::RESOLVE, yield Await::REJECT);",
        operation.kind.execute_method(),
        php_double_quoted(&operation.name),
        arguments.join(", ")
    ));
    lines.line(&format!("{indent}{indent}return yield Await::ONCE;"));
    lines.line(&format!("{indent}}}"));
}

fn doc_lines(operation: &MergedOperation) -> Vec<String> {
    let mut doc_lines = Vec::new();
    if let Some(doc) = &operation.doc {
        doc_lines.push(format!("<i>(Description from {})</i>", doc.file.display()));
        doc_lines.push(String::new());
        doc_lines.extend(doc.text.lines().map(str::to_string));
        doc_lines.push(String::new());
    }
    doc_lines.push("<h4>Declared in:</h4>".to_string());
    for provenance in &operation.provenance {
        doc_lines.push(format!(
            "- {}:{}",
            provenance.file.display(),
            provenance.line
        ));
    }
    for parameter in &operation.parameters.parameters {
        doc_lines.push(format!(
            "@param {} ${}",
            doc_type(&parameter.decl),
            parameter.name
        ));
    }
    doc_lines.push(format!(
        "@return {RETURN_PREFIX}{}>",
        operation.kind.return_type()
    ));
    doc_lines
}

fn escape_comment(line: &str) -> String {
    line.replace("*/", "*\\/")
}

fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::String | ScalarType::Timestamp => "string",
        ScalarType::Int => "int",
        ScalarType::Float => "float",
        ScalarType::Bool => "bool",
    }
}

fn value_type(decl: &VariableDecl) -> String {
    let nullable = if decl.nullable { "?" } else { "" };
    format!("{nullable}{}", scalar_type(decl.scalar))
}

fn doc_type(decl: &VariableDecl) -> String {
    if decl.list {
        format!("list<{}>", value_type(decl))
    } else {
        value_type(decl)
    }
}

fn signature_parameter(parameter: &ReconciledParameter) -> String {
    let decl = &parameter.decl;
    let php_type = if decl.list {
        "array".to_string()
    } else {
        value_type(decl)
    };
    match (&decl.default, decl.optional) {
        (Some(default), true) => {
            format!("{php_type} ${} = {}", parameter.name, php_literal(default))
        }
        _ => format!("{php_type} ${}", parameter.name),
    }
}

pub(crate) fn php_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "null".to_string(),
        DefaultValue::Int(value) => value.to_string(),
        // Debug keeps a fractional part or exponent, so the literal stays a float.
        DefaultValue::Float(value) => format!("{value:?}"),
        DefaultValue::Bool(value) => value.to_string(),
        DefaultValue::String(value) => php_single_quoted(value),
        DefaultValue::Now => php_single_quoted("NOW"),
    }
}

fn php_single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn php_double_quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('$', "\\$")
}
