use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use umlgen::{
    CodeBundle, Dialect, LogicalModel, NamingConfig, PhysicalModel, build, codegen, diff, sql,
};

/// UML class diagram compiler
#[derive(Parser, Debug)]
#[command(name = "umlgen")]
#[command(version, about = "Derive SQL schemas and Spring Boot backends from class diagrams")]
struct Cli {
    /// Log debug output for every stage
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a model and report every error found
    Check {
        /// Input model (.json editor export, anything else is read as diagram text)
        input: PathBuf,
    },
    /// Emit the DDL schema
    Sql {
        #[command(flatten)]
        model: ModelArgs,

        /// SQL dialect (postgresql, mysql, generic)
        #[arg(short, long, default_value = "postgresql", value_parser = parse_dialect)]
        dialect: Dialect,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate the backend source tree
    Generate {
        #[command(flatten)]
        model: ModelArgs,

        /// Base Java package
        #[arg(short, long)]
        package: Option<String>,

        /// Project name
        #[arg(long)]
        project: Option<String>,

        /// Also write pom.xml, the application class and resources
        #[arg(long)]
        scaffold: bool,

        /// SQL dialect for the scaffolded datasource and schema
        #[arg(short, long, default_value = "postgresql", value_parser = parse_dialect)]
        dialect: Dialect,

        /// Output directory
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Input model (.json editor export, anything else is read as diagram text)
    input: PathBuf,

    /// Earlier model; only tables and enums it lacks are emitted
    #[arg(short, long)]
    baseline: Option<PathBuf>,
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    Dialect::from_str(s).ok_or_else(|| format!("unknown dialect `{}`", s))
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("umlgen={}", level).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Check { input } => {
            let physical = load(&input)?;
            println!(
                "{}: {} tables, {} relationships, {} enums",
                input.display(),
                physical.tables.len(),
                physical.relationships.len(),
                physical.enums.len()
            );
            Ok(())
        }
        Command::Sql {
            model,
            dialect,
            output,
        } => {
            let physical = load(&model.input)?;
            let ddl = match &model.baseline {
                Some(path) => diff::regenerate_ddl(&load(path)?, &physical, dialect),
                None => sql::emit_with_dialect(&physical, dialect),
            };
            match output {
                Some(path) => {
                    fs::write(&path, &ddl)
                        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
                    info!(path = %path.display(), dialect = dialect.name(), "wrote schema");
                }
                None => print!("{}", ddl),
            }
            Ok(())
        }
        Command::Generate {
            model,
            package,
            project,
            scaffold,
            dialect,
            output,
        } => {
            let cfg = NamingConfig::from_options(package.as_deref(), project.as_deref())?;
            let physical = load(&model.input)?;
            let mut bundle = match &model.baseline {
                Some(path) => diff::regenerate(&load(path)?, &physical, &cfg)?,
                None => codegen::generate(&physical, &cfg)?,
            };
            if scaffold {
                bundle.extend(codegen::scaffold(&physical, &cfg, dialect));
            }
            write_bundle(&bundle, &output)
        }
    }
}

fn read_model(path: &Path) -> Result<LogicalModel, Box<dyn Error>> {
    let input = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let model = if path.extension().is_some_and(|ext| ext == "json") {
        umlgen::model_from_json(&input)?
    } else {
        umlgen::model_from_dsl(&input)?
    };
    Ok(model)
}

fn load(path: &Path) -> Result<PhysicalModel, Box<dyn Error>> {
    let model = read_model(path)?;
    Ok(build(&model)?)
}

fn write_bundle(bundle: &CodeBundle, root: &Path) -> Result<(), Box<dyn Error>> {
    for (path, source) in bundle.iter() {
        let target = root.join(path);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&target, source)
            .map_err(|e| format!("failed to write {}: {}", target.display(), e))?;
    }
    info!(files = bundle.len(), output = %root.display(), "wrote sources");
    Ok(())
}
