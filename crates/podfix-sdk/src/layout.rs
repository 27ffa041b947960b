//! Where the pieces of a Flutter iOS project live.

use std::path::{Component, Path, PathBuf};

use crate::types::BuildFlavor;

/// Directory CocoaPods writes per-target support files into, under the
/// Pods directory.
pub const TARGET_SUPPORT_FILES: &str = "Target Support Files";

/// Paths and names the podfix operations work with.
///
/// Every path except `root` is relative to `root`. Operations resolve them
/// with [`IosLayout::resolve`] and report them unresolved, so diagnostics
/// read the same regardless of where the tool was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosLayout {
    /// Project root (the directory holding `pubspec.yaml`).
    pub root: PathBuf,
    /// File whose presence identifies the project root.
    pub marker: PathBuf,
    /// The `.xcodeproj` bundle.
    pub xcodeproj: PathBuf,
    /// Directory holding `Debug.xcconfig`, `Profile.xcconfig` and `Release.xcconfig`.
    pub flutter_dir: PathBuf,
    /// CocoaPods installation directory.
    pub pods_dir: PathBuf,
    /// Name of the app target.
    pub target: String,
}

impl IosLayout {
    /// Joins a root-relative path onto `root`.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.resolve(&self.marker)
    }

    pub fn xcodeproj_path(&self) -> PathBuf {
        self.resolve(&self.xcodeproj)
    }

    /// Directory containing the `.xcodeproj` bundle, relative to `root`.
    /// File references in the project resolve against it.
    pub fn ios_dir(&self) -> &Path {
        self.xcodeproj.parent().unwrap_or(Path::new(""))
    }

    /// Include file for `flavor`, relative to `root`.
    pub fn include_file(&self, flavor: BuildFlavor) -> PathBuf {
        self.flutter_dir.join(flavor.xcconfig_name())
    }

    /// CocoaPods aggregate target name (`Pods-Runner`).
    pub fn pods_target(&self) -> String {
        format!("Pods-{}", self.target)
    }

    /// CocoaPods support file for `flavor`, relative to `root`.
    pub fn pods_support_file(&self, flavor: BuildFlavor) -> PathBuf {
        let pods_target = self.pods_target();
        self.pods_dir
            .join(TARGET_SUPPORT_FILES)
            .join(&pods_target)
            .join(format!("{pods_target}.{}.xcconfig", flavor.token()))
    }
}

/// Relative path from directory `from` to `to`, with `/` separators.
///
/// Both paths must be relative to the same base. `.` components are
/// ignored.
///
/// ```
/// use std::path::Path;
/// use podfix_sdk::relative_path;
///
/// assert_eq!(relative_path(Path::new("ios"), Path::new("ios/Flutter/Debug.xcconfig")), "Flutter/Debug.xcconfig");
/// assert_eq!(relative_path(Path::new("ios/Flutter"), Path::new("ios/Pods")), "../Pods");
/// ```
pub fn relative_path(from: &Path, to: &Path) -> String {
    let parts = |path: &Path| -> Vec<String> {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect()
    };
    let from = parts(from);
    let to = parts(to);

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut rel: Vec<String> = vec!["..".to_string(); from.len() - common];
    rel.extend(to[common..].iter().cloned());

    if rel.is_empty() {
        ".".to_string()
    } else {
        rel.join("/")
    }
}
