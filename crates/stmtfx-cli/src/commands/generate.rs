use crate::support::{exit_with_error, flush_notices};
use stmtfx_decl::{DeclarationParser, InputSpec};
use stmtfx_kernel::{
    Diagnostics, EmitOptions, GenerateRequest, Indent, LineEnding, StructKind,
};
use std::path::PathBuf;

pub struct Args {
    pub out_dir: PathBuf,
    pub output_name: String,
    pub inputs: InputSpec,
    pub prefix: String,
    pub eol: Option<LineEnding>,
    pub spaces: Option<usize>,
    pub structure: StructKind,
}

pub fn run(args: Args) {
    let request = request_from(args);
    let mut diagnostics = Diagnostics::new();
    let result = stmtfx_kernel::run(&request, &DeclarationParser, &mut diagnostics);
    flush_notices(&diagnostics);

    match result {
        Ok(report) => println!(
            "[*] Wrote {} ({} operations from {} files)",
            report.output_path.display(),
            report.operations,
            report.input_files.len()
        ),
        Err(err) => exit_with_error(&err),
    }
}

fn request_from(args: Args) -> GenerateRequest {
    GenerateRequest {
        output_dir: args.out_dir,
        output_name: args.output_name,
        inputs: args.inputs,
        options: EmitOptions {
            prefix: args.prefix,
            line_ending: args.eol.unwrap_or_default(),
            indent: args.spaces.map_or(Indent::Tab, Indent::Spaces),
            structure: args.structure,
        },
    }
}
