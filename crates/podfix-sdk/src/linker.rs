//! Wires the include files into the app target's build configurations.

use podfix_pbxproj::Project;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::layout::{IosLayout, relative_path};
use crate::types::{BuildFlavor, FixError};

/// Whether a flavor's file reference already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAction {
    Reused,
    Created,
}

/// Outcome for one flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub flavor: BuildFlavor,
    /// Path recorded in the file reference, relative to the project's base
    /// directory.
    pub file_path: String,
    pub reference: ReferenceAction,
    /// `false` when the target has no configuration named after the flavor.
    pub linked: bool,
}

/// Result of [`link_base_configurations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub target: String,
    pub entries: Vec<LinkEntry>,
}

impl LinkReport {
    /// Number of configurations that now point at their include file.
    pub fn linked(&self) -> usize {
        self.entries.iter().filter(|e| e.linked).count()
    }

    /// Number of file references added to the project.
    pub fn created(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.reference == ReferenceAction::Created)
            .count()
    }
}

/// Sets each flavor's include file as the base configuration of the
/// same-named configuration of the layout's target, then saves the project.
///
/// Existing file references with a matching path are reused, so running this
/// again changes nothing. Configurations are matched by exact name; a flavor
/// with no configuration is reported and skipped.
///
/// # Errors
///
/// Fails if the project cannot be opened or saved, or the target is absent.
/// Nothing is written in that case.
pub fn link_base_configurations(layout: &IosLayout) -> Result<LinkReport, FixError> {
    let mut project = Project::open(layout.xcodeproj_path())?;
    let target = project.find_target(&layout.target)?;
    let mut entries = Vec::with_capacity(BuildFlavor::ALL.len());

    for flavor in BuildFlavor::ALL {
        let file_path = relative_path(layout.ios_dir(), &layout.include_file(flavor));

        let (file, reference) = match project.find_file_by_path(&file_path) {
            Some(file) => {
                debug!(%flavor, id = %file.id, "reusing file reference");
                (file, ReferenceAction::Reused)
            }
            None => (project.new_file(&file_path)?, ReferenceAction::Created),
        };

        let linked = match project.find_build_configuration(&target, flavor.as_str())? {
            Some(config) => {
                project.set_base_configuration(&config, &file)?;
                true
            }
            None => {
                warn!(
                    target = %target.name,
                    configuration = flavor.as_str(),
                    "no build configuration for flavor; skipping"
                );
                false
            }
        };

        entries.push(LinkEntry {
            flavor,
            file_path,
            reference,
            linked,
        });
    }

    project.save()?;

    let report = LinkReport {
        target: target.name,
        entries,
    };
    info!(
        target = %report.target,
        linked = report.linked(),
        created = report.created(),
        "base configurations linked"
    );
    Ok(report)
}
