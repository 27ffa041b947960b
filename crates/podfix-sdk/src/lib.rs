//! Repair and verification of a Flutter iOS project's build configuration.
//!
//! A Flutter iOS project expects each build configuration of the `Runner`
//! target to use `Flutter/<Config>.xcconfig` as its base configuration, and
//! each of those files to include both the CocoaPods support file and
//! Flutter's `Generated.xcconfig`. When that wiring is lost, `pod install`
//! warns and the build picks up the wrong settings.
//!
//! # Operations
//!
//! | Operation | Function |
//! |-----------|----------|
//! | Write the three include files | [`write_include_files`] |
//! | Wire them into the target | [`link_base_configurations`] |
//! | Set the bundle identifier on every configuration | [`set_bundle_identifier`] |
//! | Check everything without mutating | [`verify`] |
//!
//! Every operation takes an [`IosLayout`] (or explicit paths) describing
//! where things live. The SDK has no built-in path conventions; callers
//! supply them.
//!
//! # Example
//!
//! ```ignore
//! use podfix_sdk::{IosLayout, link_base_configurations, verify, write_include_files};
//!
//! let layout = IosLayout {
//!     root: ".".into(),
//!     marker: "pubspec.yaml".into(),
//!     xcodeproj: "ios/Runner.xcodeproj".into(),
//!     flutter_dir: "ios/Flutter".into(),
//!     pods_dir: "ios/Pods".into(),
//!     target: "Runner".into(),
//! };
//!
//! write_include_files(&layout)?;
//! link_base_configurations(&layout)?;
//!
//! let report = verify(&layout)?;
//! if !report.passed() {
//!     eprintln!("run `cd ios && pod install`");
//! }
//! # Ok::<(), podfix_sdk::FixError>(())
//! ```

pub mod bundle_id;
pub mod layout;
pub mod linker;
pub mod types;
pub mod verify;
pub mod xcconfig;

pub use bundle_id::{BUNDLE_ID_SETTING, set_bundle_identifier};
pub use layout::{IosLayout, relative_path};
pub use linker::{LinkEntry, LinkReport, ReferenceAction, link_base_configurations};
pub use types::{BuildFlavor, FixError};
pub use verify::{
    BaseConfiguration, IncludeCheck, IncludeStatus, SupportFileCheck, VerifyReport, verify,
};
pub use xcconfig::{IncludeFileSpec, write_include_files};

pub use podfix_pbxproj;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
