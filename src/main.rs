//! Mini-Pascal Compiler CLI
//!
//! Compiles a single source file to textual VM assembly, `cod_vm.txt` by
//! default. Diagnostics go to stderr; the exit code is nonzero on any
//! lexical, syntax, or semantic error.

use std::path::PathBuf;
use std::process;

use clap::Parser;

#[derive(Parser)]
#[command(name = "minipascal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile Mini-Pascal source to stack-VM assembly", long_about = None)]
struct Cli {
    /// Input Pascal source file
    source: PathBuf,

    /// Output assembly file
    #[arg(short, long, default_value = "cod_vm.txt")]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    if let Err(message) = minipascal::compile_file(&cli.source, &cli.output) {
        eprintln!("{}", message);
        process::exit(1);
    }
}
