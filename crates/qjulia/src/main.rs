use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use qjulia::config::RunConfig;
use qjulia::pipeline::generate_stl;

/// Printed alongside configuration errors, mirroring the expected file
/// layout line by line.
const SAMPLE_CONFIG: &str = "\
100     // Grid resolution (an unsigned integer)
8       // Vertex refinement steps (an unsigned integer)
0.001   // Shell thickness (a real number [0, 1]) -- use 0 to make a solid object
-1.5    // Grid minimum extent (a real number)
1.5     // Grid maximum extent (a real number)
8       // Maximum iterations (an unsigned integer)
4.0     // Threshold (a real number)
0.0     // Z.w (a real number)
0.3     // C.x (a real number)
0.5     // C.y (a real number)
0.4     // C.z (a real number)
0.2     // C.w (a real number)
Z = sin(Z) + C * sin(Z)  // Iterative equation
addblock, 0.93, 0.97, 0.01, 0.15, 0.2,  0.8 // Add a block: x start, x end, ...
addblock, 0.03, 0.07, 0.01, 0.15, 0.2,  0.8
subblock, 0.95, 1,    0.3,  0.33, 0.3,  0.33 // Subtract a block: ...
subblock, 0,    0.05, 0.67, 0.7,  0.67, 0.7";

#[derive(Parser)]
#[command(author, version, about = "Quaternion Julia set isosurface extractor", long_about = None)]
struct Cli {
    /// Path of the configuration file to read.
    config: Option<PathBuf>,

    /// Path of the binary STL file to write.
    output: Option<PathBuf>,

    /// Optional evaluator selection: `-cpu`, `/cpu`, or `cpu` forces the
    /// reference evaluator.
    #[arg(allow_hyphen_values = true, trailing_var_arg = true, num_args = 0..)]
    backend: Vec<String>,
}

fn print_usage() {
    println!("Example usage: qjulia config.txt fractal.stl [-cpu]");
}

/// Runs the CLI and maps outcomes to exit codes: 0 for success or usage
/// help, 1 for configuration errors, 2 for generation errors.
fn run(cli: &Cli) -> u8 {
    let (Some(config_path), Some(output_path)) = (&cli.config, &cli.output) else {
        print_usage();
        return 0;
    };

    let force_cpu = match cli.backend.as_slice() {
        [] => false,
        [token] => {
            let token = token.to_ascii_lowercase();
            if token == "-cpu" || token == "/cpu" || token == "cpu" {
                true
            } else {
                print_usage();
                return 0;
            }
        }
        _ => {
            print_usage();
            return 0;
        }
    };

    let config = match RunConfig::from_file(config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            eprintln!(
                "Error reading {} -- try using the following sample configuration file:",
                config_path.display()
            );
            eprintln!("{SAMPLE_CONFIG}");
            return 1;
        }
    };

    match generate_stl(&config, output_path, force_cpu) {
        Ok(_) => 0,
        Err(error) => {
            eprintln!("Error: {error}");
            2
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!(
        "Quaternion Julia set isosurface extractor v{}",
        env!("CARGO_PKG_VERSION")
    );

    let cli = Cli::parse();
    ExitCode::from(run(&cli))
}
