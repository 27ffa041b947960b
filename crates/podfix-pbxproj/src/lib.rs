//! Reader and writer for Xcode `project.pbxproj` files.
//!
//! An `.xcodeproj` bundle stores the whole project in a single file,
//! `project.pbxproj`, written in the OpenStep (NeXTSTEP) property list
//! format. This crate parses that file into a [`Value`] tree, exposes the
//! handful of typed operations podfix needs through [`Project`], and writes
//! the tree back in the layout Xcode itself produces.
//!
//! ## Supported operations
//!
//! | Operation | Method |
//! |-----------|--------|
//! | Open a bundle | [`Project::open`] |
//! | Find a target by name | [`Project::find_target`] |
//! | List a target's build configurations | [`Project::build_configurations`] |
//! | Find / create file references | [`Project::find_file_by_path`], [`Project::new_file`] |
//! | Read / set base configuration files | [`Project::base_configuration`], [`Project::set_base_configuration`] |
//! | Read / set build settings | [`Project::build_setting`], [`Project::set_build_setting`] |
//! | Persist | [`Project::save`] |
//!
//! Changes are held in memory until [`Project::save`] is called. Dropping a
//! [`Project`] without saving discards every mutation.
//!
//! ## Example
//!
//! ```ignore
//! use podfix_pbxproj::Project;
//!
//! let mut project = Project::open("ios/Runner.xcodeproj")?;
//! let target = project.find_target("Runner")?;
//! for config in project.build_configurations(&target)? {
//!     project.set_build_setting(&config, "PRODUCT_BUNDLE_IDENTIFIER", "com.example.app")?;
//! }
//! project.save()?;
//! # Ok::<(), podfix_pbxproj::PbxError>(())
//! ```

use std::io;
use std::path::PathBuf;

pub mod plist;
pub mod project;
mod writer;

pub use plist::{Dictionary, SyntaxError, Value};
pub use project::{BuildConfiguration, FileReference, Project, Target};

/// File name of the property list inside an `.xcodeproj` bundle.
pub const PBXPROJ_FILE: &str = "project.pbxproj";

/// Errors raised while loading, querying, or saving a project.
#[derive(Debug, thiserror::Error)]
pub enum PbxError {
    /// The project file could not be read.
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The project file could not be written.
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The project file is not a valid OpenStep property list.
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The property list parsed but does not have the shape of an Xcode project.
    #[error("malformed project: {0}")]
    Malformed(String),

    /// An object id referenced from the project graph has no entry in `objects`.
    #[error("object {id} referenced by {referrer} is missing from the project")]
    MissingObject { id: String, referrer: String },

    /// No target with the requested name exists in the project.
    #[error("{0} target not found")]
    TargetNotFound(String),
}
