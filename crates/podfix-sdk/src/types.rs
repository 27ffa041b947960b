//! Core types for podfix-sdk.
//!
//! - [`FixError`] - Error type for every SDK operation
//! - [`BuildFlavor`] - The three Flutter build configurations

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

pub use podfix_pbxproj::PbxError;

/// Error types for podfix-sdk operations.
///
/// Verification mismatches are not errors: they are recorded in a
/// [`crate::VerifyReport`]. A `FixError` always means the operation could
/// not run to completion.
///
/// # Example
///
/// ```ignore
/// use podfix_sdk::{FixError, link_base_configurations};
/// use podfix_sdk::podfix_pbxproj::PbxError;
///
/// match link_base_configurations(&layout) {
///     Ok(report) => println!("linked {} configurations", report.linked()),
///     Err(FixError::Project(PbxError::TargetNotFound(name))) => {
///         eprintln!("{name} target not found");
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// The project file could not be read, parsed, queried, or saved.
    ///
    /// This includes a missing target.
    #[error(transparent)]
    Project(#[from] PbxError),

    /// A file or directory could not be created, read, or written.
    #[error("I/O error at {}. Check file paths and permissions", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required file or bundle is absent.
    ///
    /// The message is meant to be shown to the user as-is.
    #[error("{0}")]
    Precondition(String),
}

impl FixError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A Flutter build configuration.
///
/// Each flavor names an `XCBuildConfiguration` (`"Debug"`) and a lower-case
/// token used in CocoaPods file names (`"debug"`).
///
/// # Example
///
/// ```
/// use podfix_sdk::BuildFlavor;
///
/// assert_eq!(BuildFlavor::Profile.as_str(), "Profile");
/// assert_eq!(BuildFlavor::Profile.token(), "profile");
/// assert_eq!(BuildFlavor::Profile.xcconfig_name(), "Profile.xcconfig");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BuildFlavor {
    Debug,
    Profile,
    Release,
}

impl BuildFlavor {
    /// All flavors, in the order the tools process them.
    pub const ALL: [BuildFlavor; 3] = [BuildFlavor::Debug, BuildFlavor::Profile, BuildFlavor::Release];

    /// Build configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildFlavor::Debug => "Debug",
            BuildFlavor::Profile => "Profile",
            BuildFlavor::Release => "Release",
        }
    }

    /// Lower-case token used in CocoaPods support file names.
    pub fn token(&self) -> &'static str {
        match self {
            BuildFlavor::Debug => "debug",
            BuildFlavor::Profile => "profile",
            BuildFlavor::Release => "release",
        }
    }

    /// File name of the flavor's include file.
    pub fn xcconfig_name(&self) -> String {
        format!("{}.xcconfig", self.as_str())
    }
}

impl fmt::Display for BuildFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
