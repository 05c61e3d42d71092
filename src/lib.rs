//! Typed configuration sections populated from INI files.
//!
//! A section is declared with [`SectionDecl`], listing its settings and their
//! defaults. Building it against a [`ConfigStore`] clones inherited settings,
//! records the defaults and, if the section names a file and a header, loads
//! the values found there. Bad values are logged and the default is kept.
//!
//! ```no_run
//! use confsection::{ConfigStore, SearchDirectories, SectionDecl};
//! use std::path::Path;
//!
//! let store = ConfigStore::new(
//!     SearchDirectories::new().with_local(Some(Path::new("config"))),
//! );
//! let server = SectionDecl::new("Server")
//!     .config_file("server.ini")
//!     .section("server")
//!     .value("port", 80)
//!     .value("host", "localhost")
//!     .build(&store)?;
//! let port: Option<i64> = server.get_as("port")?;
//! # Ok::<(), confsection::ConfigError>(())
//! ```

pub mod config;
pub mod datatypes;
pub mod dump;
pub mod error;
pub mod section;
pub mod setting;

pub use config::{
    candidate_paths, ApplyReport, ConfigFile, ConfigStore, DirectoryResolver, SearchDirectories,
};
pub use datatypes::{parse_bool, parse_list, FromValue, Kind, ParseValue, Value};
pub use dump::{dump_settings, file_to_text, file_to_toml, section_to_toml};
pub use error::{ConfigError, ConversionError, InterpolationError};
pub use section::{build_section, Section, SectionDecl};
pub use setting::Setting;
