mod common;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use plant_ml::{ClassifyError, ClassifyOutput, classify_image};

#[derive(Parser, Debug)]
#[command(
    about = "Classify a plant leaf image and print the result as JSON",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Path to the input image.
    #[arg(value_parser = clap::value_parser!(OsString))]
    image_path: OsString,
    /// Path to the model checkpoint (.safetensors or a .pth state dict).
    #[arg(value_parser = clap::value_parser!(OsString))]
    model_path: OsString,
}

impl Args {
    /// Only the argument count decides a usage error; any two values are
    /// taken verbatim as paths, including empty strings and a literal `--`.
    fn from_os_args(argv: Vec<OsString>) -> Option<Self> {
        if argv.len() != 3 {
            return None;
        }
        let mut argv = argv.into_iter();
        let program = argv.next()?;
        // Everything after the first `--` is positional to clap.
        let escaped = [program, OsString::from("--")].into_iter().chain(argv);
        match Args::try_parse_from(escaped) {
            Ok(args) => Some(args),
            Err(err) => {
                tracing::debug!(error = %err, "rejected arguments");
                None
            }
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    common::init_tracing();

    let Some(args) = Args::from_os_args(std::env::args_os().collect()) else {
        print_json(&ClassifyOutput::Error {
            error: ClassifyError::Usage,
        })?;
        return Ok(ExitCode::FAILURE);
    };

    let image_path = PathBuf::from(args.image_path);
    let model_path = PathBuf::from(args.model_path);
    let output = ClassifyOutput::from(classify_image(&image_path, &model_path));
    if let ClassifyOutput::Error { error } = &output {
        tracing::debug!(error = %format!("{error:#}"), "classification failed");
    }
    // Pipeline failures still exit 0; callers read the `error` field.
    print_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

fn print_json(output: &ClassifyOutput) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(output)?);
    Ok(())
}
