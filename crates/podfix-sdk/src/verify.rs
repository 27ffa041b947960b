//! Read-only check of the include files, their wiring and the CocoaPods
//! support files.

use std::fs;
use std::io::ErrorKind;

use podfix_pbxproj::Project;
use serde::Serialize;
use tracing::{debug, info};

use crate::layout::IosLayout;
use crate::types::{BuildFlavor, FixError};
use crate::xcconfig::IncludeFileSpec;

/// State of one include file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeStatus {
    Ok,
    Missing,
    /// The file exists but its first two lines differ from the canonical ones.
    NotCanonical,
}

/// A build configuration of the target and its base configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseConfiguration {
    pub name: String,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeCheck {
    pub flavor: BuildFlavor,
    pub path: String,
    pub status: IncludeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportFileCheck {
    pub flavor: BuildFlavor,
    pub path: String,
    pub exists: bool,
}

/// Everything [`verify`] found. Paths are relative to the layout root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub target: String,
    pub passed: bool,
    pub base_configurations: Vec<BaseConfiguration>,
    pub include_files: Vec<IncludeCheck>,
    pub support_files: Vec<SupportFileCheck>,
}

impl VerifyReport {
    /// True when every include file is canonical and every support file
    /// exists. Base configurations do not affect the verdict.
    pub fn passed(&self) -> bool {
        self.passed
    }
}

/// Inspects the project described by `layout` without modifying anything.
///
/// Every check runs even after one fails, so the report is complete.
///
/// # Errors
///
/// Returns [`FixError::Precondition`] when the marker file or the project
/// bundle is missing, and an error when the project cannot be parsed, the
/// target is absent, or an include file exists but cannot be read. Include
/// files that are not valid UTF-8 are reported as not canonical.
pub fn verify(layout: &IosLayout) -> Result<VerifyReport, FixError> {
    if !layout.marker_path().exists() {
        return Err(FixError::Precondition(format!(
            "run from project root ({} missing)",
            layout.marker.display()
        )));
    }
    if !layout.xcodeproj_path().exists() {
        return Err(FixError::Precondition(format!(
            "iOS project missing ({})",
            layout.xcodeproj.display()
        )));
    }

    let project = Project::open(layout.xcodeproj_path())?;
    let target = project.find_target(&layout.target)?;

    let base_configurations = project
        .build_configurations(&target)?
        .into_iter()
        .map(|config| BaseConfiguration {
            path: project.base_configuration(&config).and_then(|file| file.path),
            name: config.name,
        })
        .collect();

    let include_files = BuildFlavor::ALL
        .into_iter()
        .map(|flavor| check_include_file(layout, flavor))
        .collect::<Result<Vec<_>, _>>()?;

    let support_files: Vec<_> = BuildFlavor::ALL
        .into_iter()
        .map(|flavor| {
            let relative = layout.pods_support_file(flavor);
            SupportFileCheck {
                flavor,
                exists: layout.resolve(&relative).exists(),
                path: relative.display().to_string(),
            }
        })
        .collect();

    let passed = include_files.iter().all(|c| c.status == IncludeStatus::Ok)
        && support_files.iter().all(|c| c.exists);

    info!(target = %target.name, passed, "verification finished");
    Ok(VerifyReport {
        target: target.name,
        passed,
        base_configurations,
        include_files,
        support_files,
    })
}

fn check_include_file(layout: &IosLayout, flavor: BuildFlavor) -> Result<IncludeCheck, FixError> {
    let relative = layout.include_file(flavor);
    let path = layout.resolve(&relative);

    // Undecodable bytes can never equal the canonical lines, so they are a
    // mismatch like any other.
    let status = match fs::read(&path) {
        Ok(bytes)
            if IncludeFileSpec::new(layout, flavor).matches(&String::from_utf8_lossy(&bytes)) =>
        {
            IncludeStatus::Ok
        }
        Ok(_) => IncludeStatus::NotCanonical,
        Err(e) if e.kind() == ErrorKind::NotFound => IncludeStatus::Missing,
        Err(e) => return Err(FixError::io(path, e)),
    };
    debug!(%flavor, ?status, "checked include file");

    Ok(IncludeCheck {
        flavor,
        path: relative.display().to_string(),
        status,
    })
}
