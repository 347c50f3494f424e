use clap::{Parser, Subcommand};
use retouch::imaging::{ImageCodec, Operator, RustCodec};
use retouch::session::EditSession;
use retouch::shell::{Outcome, Shell, ShellCommand};
use retouch::{config, output};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Apply filters and transforms to images, with undo")]
#[command(long_about = "\
Apply filters and transforms to images, with undo

Operators are written NAME or NAME:ARGS:

  grayscale               Luma to all three channels
  blur[:N]                Gaussian blur, kernel size 1-31 (default 5)
  edges[:LOW,HIGH]        Canny edge map (default 100,200)
  brightness:F            Scale brightness, 0.5-2.0
  contrast:F              Stretch contrast, 0.5-2.0
  rotate:DEG              90 (counter-clockwise), 180, 270
  flip:DIR                horizontal | vertical
  resize:WxH              Bilinear resample

Examples:

  retouch apply in.jpg out.png --op grayscale --op rotate:90
  retouch shell in.jpg

Formats: jpg, jpeg, png, bmp (chosen by extension).

Run 'retouch gen-config' to generate a documented retouch.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./retouch.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load an image, apply operators in order, and save the result
    Apply {
        input: PathBuf,
        output: PathBuf,
        /// Operator to apply; repeat for a chain
        #[arg(long = "op", value_name = "OP")]
        ops: Vec<String>,
    },
    /// Print an image's dimensions
    Info { input: PathBuf },
    /// Interactive edit shell reading commands from stdin
    Shell { input: Option<PathBuf> },
    /// Print a stock retouch.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Apply { input, output: dest, ops } => {
            let config = setup(config_path)?;
            let defaults = config.operator_defaults();
            let ops = ops
                .iter()
                .map(|text| Operator::parse_with(text, &defaults))
                .collect::<Result<Vec<_>, _>>()?;

            let mut session = EditSession::from_config(&config);
            let input_dims = session.load(&input)?;
            for op in &ops {
                session.apply(op)?;
            }
            session.save(&dest)?;
            output::print_apply_output(&input, input_dims, &ops, &dest, session.dimensions());
        }
        Command::Info { input } => {
            let dims = RustCodec::new().identify(&input)?;
            output::print_info(&input, dims);
        }
        Command::Shell { input } => {
            let config = setup(config_path)?;
            let session = EditSession::from_config(&config);
            let mut shell = Shell::new(session, config.operator_defaults());
            if let Some(path) = input {
                match shell.execute(ShellCommand::Load(path)) {
                    Ok(Outcome::Continue(lines)) => lines.iter().for_each(|l| println!("{}", l)),
                    Ok(Outcome::Quit) => {}
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            let stdin = std::io::stdin();
            let prompt = stdin.is_terminal();
            shell.run(stdin.lock(), std::io::stdout().lock(), prompt)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config and size the thread pool from it.
fn setup(path: Option<&Path>) -> Result<config::EditorConfig, config::ConfigError> {
    let config = load_config(path)?;
    init_thread_pool(&config.processing);
    Ok(config)
}

/// Explicit `--config` must exist; otherwise `retouch.toml` in the working
/// directory is used when present.
fn load_config(path: Option<&Path>) -> Result<config::EditorConfig, config::ConfigError> {
    match path {
        Some(p) => config::load_config_file(p),
        None => config::load_config(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
