use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use confsection::{
    dump_settings, file_to_text, file_to_toml, section_to_toml, ConfigStore, Kind,
    SearchDirectories, SectionDecl, Value,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "confsection")]
#[command(version, about = "Inspect INI configuration files and typed sections")]
struct Cli {
    /// Directory searched for configuration files, in override order
    /// (default: /etc, then the current directory)
    #[arg(long = "dir", value_name = "DIR", global = true)]
    dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the raw sections of a configuration file
    Show {
        file: String,
        section: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print one value converted to a kind
    Get {
        file: String,
        section: String,
        key: String,
        /// bool, int, float, str or list
        #[arg(long, default_value = "str")]
        kind: Kind,
        /// Printed when the key is missing or invalid
        #[arg(long, default_value = "")]
        default: String,
    },
    /// Declare a section, bind it to a file section and print the result
    Bind {
        file: String,
        section: String,
        /// Setting as NAME=KIND[:DEFAULT], e.g. port=int:80
        #[arg(long = "setting", value_name = "SETTING", value_parser = parse_setting_arg)]
        settings: Vec<SettingArg>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum Format {
    Text,
    Toml,
}

#[derive(Clone)]
struct SettingArg {
    name: String,
    kind: Kind,
    default: Option<String>,
}

fn parse_setting_arg(s: &str) -> Result<SettingArg, String> {
    let (name, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=KIND[:DEFAULT], got '{s}'"))?;
    let (kind, default) = match rest.split_once(':') {
        Some((kind, default)) => (kind, Some(default.to_string())),
        None => (rest, None),
    };
    Ok(SettingArg {
        name: name.trim().to_string(),
        kind: kind.trim().parse()?,
        default,
    })
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let store = build_store(&cli.dirs);

    match cli.command {
        Command::Show {
            file,
            section,
            format,
        } => show(&store, &file, section.as_deref(), format),
        Command::Get {
            file,
            section,
            key,
            kind,
            default,
        } => {
            let config = store.get_or_create(&file);
            let value = config.get_value(&section, &key, &kind, Value::String(default));
            println!("{value}");
            ExitCode::SUCCESS
        }
        Command::Bind {
            file,
            section,
            settings,
            format,
        } => bind(&store, &file, &section, settings, format),
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confsection=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_store(dirs: &[PathBuf]) -> ConfigStore {
    if dirs.is_empty() {
        let cwd = std::env::current_dir().ok();
        ConfigStore::new(SearchDirectories::new().with_local(cwd.as_deref()))
    } else {
        ConfigStore::new(dirs.to_vec())
    }
}

fn show(store: &ConfigStore, file: &str, section: Option<&str>, format: Format) -> ExitCode {
    let config = store.get_or_create(file);
    if config.paths().is_empty() {
        eprintln!("Error: no {file} found in search directories");
        return ExitCode::from(1);
    }
    if let Some(header) = section {
        if !config.has_section(header) {
            eprintln!("Error: {file} has no section [{header}]");
            return ExitCode::from(1);
        }
    }

    match format {
        Format::Text => {
            for path in config.paths() {
                eprintln!("Using config: {}", path.display());
            }
            print!("{}", file_to_text(&config, section));
            ExitCode::SUCCESS
        }
        Format::Toml => match file_to_toml(&config, section) {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::from(1)
            }
        },
    }
}

fn bind(
    store: &ConfigStore,
    file: &str,
    header: &str,
    settings: Vec<SettingArg>,
    format: Format,
) -> ExitCode {
    let mut decl = SectionDecl::new(header).config_file(file).section(header);
    for arg in settings {
        decl = match arg.default {
            Some(default) => decl.typed(arg.name, arg.kind, default),
            None => decl.unset(arg.name, arg.kind),
        };
    }

    let section = match decl.build(store) {
        Ok(section) => section,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match format {
        Format::Text => {
            print!("{}", dump_settings(&section));
            ExitCode::SUCCESS
        }
        Format::Toml => match section_to_toml(&section) {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::from(1)
            }
        },
    }
}
