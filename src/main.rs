//! @ai:module:intent CLI entry point for extracting, checking and inspecting annotations
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on config, extractor, reader, linter, lexer, output

use clap::{Args, Parser, Subcommand, ValueEnum};
use docanno_parser::config::{Config, DEFAULT_CONFIG_FILE};
use docanno_parser::output::FileResults;
use docanno_parser::{
    is_supported_file, linter, output, parse_files, parse_source, scan_file, Error, Lexer,
    OutputFormat, Result,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "docanno")]
#[command(author, version, about = "Parse and check annotations in documentation comments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the annotations of every documented declaration
    Extract {
        /// Path to file or directory
        path: PathBuf,

        #[command(flatten)]
        settings: Settings,

        /// Output format
        #[arg(long, short, value_enum, default_value = "json-pretty")]
        format: Format,
    },

    /// Report annotation syntax errors and unresolved names
    Lint {
        /// Path to file or directory to lint
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        settings: Settings,

        /// Report unresolved names as warnings
        #[arg(long, default_value = "false")]
        unresolved_as_warning: bool,

        /// Warn when a declaration repeats an annotation
        #[arg(long, default_value = "false")]
        warn_duplicates: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Show the token stream of an annotation text
    Tokens {
        /// Annotation text, e.g. '@Route("/", name="home")'
        #[arg(required_unless_present = "file")]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Write a default configuration file
    Init {
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

/// Options shared by the commands that parse source files.
#[derive(Args)]
struct Settings {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Additional directive names to ignore
    #[arg(long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Fully qualified type names that exist
    #[arg(long = "known-type", value_name = "TYPE")]
    known_types: Vec<String>,

    /// Accept every imported name as an existing type
    #[arg(long, default_value = "false")]
    trust_imports: bool,
}

impl Settings {
    fn load(&self) -> Result<Config> {
        let mut config = Config::load_or_default(&self.config)?;
        config.parser.ignored_names.extend(self.ignore.iter().cloned());
        config.catalog.known_types.extend(self.known_types.iter().cloned());
        config.catalog.trust_imports |= self.trust_imports;
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            path,
            settings,
            format,
        } => match extract(&path, &settings, format.into()) {
            Ok(rendered) => {
                println!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },

        Commands::Lint {
            path,
            settings,
            unresolved_as_warning,
            warn_duplicates,
            format,
        } => {
            let result = settings.load().and_then(|mut config| {
                config.lint.unresolved_as_warning |= unresolved_as_warning;
                config.lint.warn_duplicate_annotations |= warn_duplicates;

                let mut parser = config.parser();
                let catalog = config.type_catalog();
                if path.is_file() {
                    linter::lint_file(&path, &mut parser, catalog.as_ref(), &config.lint)
                } else {
                    linter::lint_directory(&path, &mut parser, catalog.as_ref(), &config.lint)
                }
            });

            match result {
                Ok(lint_result) => {
                    println!("{}", output::format_lint_result(&lint_result, format.into()));

                    if lint_result.passed() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(1)
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Tokens { text, file, format } => {
            let input = match (text, file) {
                (_, Some(file)) => std::fs::read_to_string(&file).map_err(|e| Error::FileRead {
                    path: file,
                    source: e,
                }),
                (Some(text), None) => Ok(text),
                (None, None) => Err(Error::InvalidArgument("no input text".to_string())),
            };

            match input {
                Ok(input) => {
                    let mut lexer: Lexer = Lexer::default();
                    lexer.set_input(&input);
                    print!("{}", output::format_tokens(lexer.tokens(), format.into()));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Init { output, force } => {
            if output.exists() && !force {
                eprintln!(
                    "Error: {} already exists (use --force to overwrite)",
                    output.display()
                );
                return ExitCode::from(2);
            }

            match Config::default().save(&output) {
                Ok(()) => {
                    println!("Wrote {}", output.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }
    }
}

/// Scan and parse a file or every supported file under a directory.
///
/// A single file must parse; inside a directory, failing files are logged and skipped.
fn extract(path: &Path, settings: &Settings, format: OutputFormat) -> Result<String> {
    let config = settings.load()?;
    let mut parser = config.parser();
    let catalog = config.type_catalog();

    let parsed = if path.is_file() {
        let source = scan_file(path)?;
        vec![(
            path.to_path_buf(),
            parse_source(&mut parser, &source, catalog.as_ref())?,
        )]
    } else if path.is_dir() {
        let files: Vec<PathBuf> = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        parse_files(&mut parser, &files, catalog.as_ref())
    } else {
        return Err(Error::InvalidArgument(format!(
            "path '{}' does not exist",
            path.display()
        )));
    };

    let results: Vec<FileResults<'_>> = parsed
        .iter()
        .map(|(path, declarations)| FileResults {
            path: path.as_path(),
            declarations: declarations.as_slice(),
        })
        .collect();

    Ok(output::format_source_results(&results, format))
}
