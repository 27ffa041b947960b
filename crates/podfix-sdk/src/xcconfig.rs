//! Canonical Flutter include files (`Flutter/<Config>.xcconfig`).

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::layout::{IosLayout, relative_path};
use crate::types::{BuildFlavor, FixError};

/// Flutter's generated settings file, included last by every include file.
pub const GENERATED_XCCONFIG: &str = "Generated.xcconfig";

/// The two include lines a flavor's include file must start with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeFileSpec {
    pub flavor: BuildFlavor,
    lines: [String; 2],
}

impl IncludeFileSpec {
    /// Builds the include lines for `flavor`. The Pods include is written
    /// relative to the Flutter directory.
    pub fn new(layout: &IosLayout, flavor: BuildFlavor) -> Self {
        let pods = relative_path(&layout.flutter_dir, &layout.pods_support_file(flavor));
        Self {
            flavor,
            lines: [
                format!("#include? \"{pods}\""),
                format!("#include? \"{GENERATED_XCCONFIG}\""),
            ],
        }
    }

    pub fn lines(&self) -> &[String; 2] {
        &self.lines
    }

    /// File contents: both lines, each terminated by a newline.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Whether `contents` starts with the canonical lines.
    ///
    /// Blank lines and surrounding whitespace are skipped. Anything after the
    /// first two lines is ignored.
    pub fn matches(&self, contents: &str) -> bool {
        let mut found = contents.lines().map(str::trim).filter(|line| !line.is_empty());
        self.lines
            .iter()
            .all(|expected| found.next() == Some(expected.as_str()))
    }
}

/// Writes the include file of every flavor, replacing existing contents.
///
/// Returns the written paths, relative to the layout root.
pub fn write_include_files(layout: &IosLayout) -> Result<Vec<PathBuf>, FixError> {
    let mut written = Vec::with_capacity(BuildFlavor::ALL.len());

    for flavor in BuildFlavor::ALL {
        let relative = layout.include_file(flavor);
        let path = layout.resolve(&relative);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| FixError::io(dir, e))?;
        }

        let spec = IncludeFileSpec::new(layout, flavor);
        fs::write(&path, spec.render()).map_err(|e| FixError::io(&path, e))?;
        debug!(%flavor, path = %path.display(), "wrote include file");
        written.push(relative);
    }

    info!(count = written.len(), "include files written");
    Ok(written)
}
