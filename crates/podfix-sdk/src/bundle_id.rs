//! Bundle identifier updates.

use std::path::Path;

use podfix_pbxproj::Project;
use tracing::{debug, info};

use crate::types::FixError;

/// Build setting holding the app's bundle identifier.
pub const BUNDLE_ID_SETTING: &str = "PRODUCT_BUNDLE_IDENTIFIER";

/// Sets [`BUNDLE_ID_SETTING`] to `bundle_id` on every build configuration of
/// `target`, then saves the project.
///
/// All configurations are updated, not only Debug/Profile/Release. The
/// identifier is written as given. Returns the names of the updated
/// configurations in project order.
pub fn set_bundle_identifier(
    xcodeproj: &Path,
    target: &str,
    bundle_id: &str,
) -> Result<Vec<String>, FixError> {
    if !xcodeproj.exists() {
        return Err(FixError::Precondition(format!(
            "project not found: {}\nusage: ios-set-bundle-id [PROJECT] [BUNDLE_ID]",
            xcodeproj.display()
        )));
    }

    let mut project = Project::open(xcodeproj)?;
    let target = project.find_target(target)?;

    let mut updated = Vec::new();
    for config in project.build_configurations(&target)? {
        project.set_build_setting(&config, BUNDLE_ID_SETTING, bundle_id)?;
        debug!(configuration = %config.name, "set bundle identifier");
        updated.push(config.name);
    }

    project.save()?;
    info!(target = %target.name, bundle_id, count = updated.len(), "bundle identifier set");
    Ok(updated)
}
