//! Configuration file support for podfix.
//!
//! A `podfix.toml` file records where a project keeps its iOS pieces, so
//! projects that moved away from the Flutter defaults don't have to repeat
//! the paths on every invocation.
//!
//! ## Configuration File Location
//!
//! The configuration file is searched for in the following order:
//! 1. `--config <path>` when given
//! 2. Current working directory (`./podfix.toml`)
//! 3. Parent directories (up to the repository root or filesystem root)
//!
//! Paths in the file are relative to the directory containing it, which is
//! also the project root unless `--root` says otherwise.
//!
//! ## Example Configuration
//!
//! ```toml
//! [project]
//! marker = "pubspec.yaml"
//! xcodeproj = "ios/Runner.xcodeproj"
//! flutter_dir = "ios/Flutter"
//! pods_dir = "ios/Pods"
//! target = "Runner"
//!
//! [ios]
//! bundle_id = "com.sizelove.adhdapp"
//! ```

use anyhow::{Context, Result};
use podfix_sdk::IosLayout;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "podfix.toml";

/// Bundle identifier used when neither the command line nor the config
/// file names one.
pub const DEFAULT_BUNDLE_ID: &str = "com.sizelove.adhdapp";

/// Root configuration structure for `podfix.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PodfixConfig {
    /// Where the project keeps its iOS pieces.
    pub project: ProjectConfig,

    /// iOS app settings.
    pub ios: IosConfig,
}

/// Project layout. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// File that must exist in the project root.
    ///
    /// Defaults to `pubspec.yaml`.
    pub marker: PathBuf,

    /// Xcode project bundle.
    ///
    /// Defaults to `ios/Runner.xcodeproj`.
    pub xcodeproj: PathBuf,

    /// Directory receiving `Debug.xcconfig`, `Profile.xcconfig` and
    /// `Release.xcconfig`.
    ///
    /// Defaults to `ios/Flutter`.
    pub flutter_dir: PathBuf,

    /// CocoaPods installation directory.
    ///
    /// Defaults to `ios/Pods`.
    pub pods_dir: PathBuf,

    /// App target name.
    ///
    /// Defaults to `Runner`.
    pub target: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            marker: "pubspec.yaml".into(),
            xcodeproj: "ios/Runner.xcodeproj".into(),
            flutter_dir: "ios/Flutter".into(),
            pods_dir: "ios/Pods".into(),
            target: "Runner".to_string(),
        }
    }
}

/// iOS-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IosConfig {
    /// Bundle identifier written by `set-bundle-id`.
    ///
    /// Defaults to `com.sizelove.adhdapp`.
    pub bundle_id: String,
}

impl Default for IosConfig {
    fn default() -> Self {
        Self {
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
        }
    }
}

impl PodfixConfig {
    /// Loads configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: PodfixConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Attempts to find and load configuration from the current directory
    /// or any parent directory.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((config, path)))` - Found and loaded configuration with its path
    /// * `Ok(None)` - No configuration file found
    /// * `Err` - If a config file was found but couldn't be parsed
    pub fn discover() -> Result<Option<(Self, PathBuf)>> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&cwd)
    }

    /// Attempts to find and load configuration starting from `start_dir`.
    pub fn discover_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let config = Self::load_from_file(&config_path)?;
                return Ok(Some((config, config_path)));
            }

            // Stop at repository root or filesystem root
            if current.join(".git").exists() || !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Generates a starter configuration file as a formatted TOML string.
    ///
    /// Every value is the built-in default, with comments explaining each
    /// option.
    pub fn generate_starter_toml() -> String {
        let project = ProjectConfig::default();
        let ios = IosConfig::default();

        format!(
            r#"# podfix configuration file
# Paths are relative to this file's directory. CLI flags override these settings.

[project]
# File that marks the project root
marker = "{marker}"

# Xcode project bundle
xcodeproj = "{xcodeproj}"

# Directory holding Debug.xcconfig, Profile.xcconfig and Release.xcconfig
flutter_dir = "{flutter_dir}"

# CocoaPods installation directory
pods_dir = "{pods_dir}"

# App target whose build configurations are wired
target = "{target}"

[ios]
# Bundle identifier written by `podfix set-bundle-id`
bundle_id = "{bundle_id}"
"#,
            marker = project.marker.display(),
            xcodeproj = project.xcodeproj.display(),
            flutter_dir = project.flutter_dir.display(),
            pods_dir = project.pods_dir.display(),
            target = project.target,
            bundle_id = ios.bundle_id,
        )
    }
}

/// Configuration resolver that merges config file values with CLI arguments.
///
/// CLI arguments always take precedence over config file values.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    /// Loaded configuration, if any.
    pub config: Option<PodfixConfig>,

    /// Path to the loaded config file, if any.
    pub config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Loads `explicit` when given, otherwise discovers `podfix.toml` from
    /// the current directory upward.
    ///
    /// An explicit path that cannot be read is an error; a missing
    /// discovered file just means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let found = match explicit {
            Some(path) => Some((PodfixConfig::load_from_file(path)?, path.to_path_buf())),
            None => PodfixConfig::discover()?,
        };

        Ok(match found {
            Some((config, path)) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                Self {
                    config: Some(config),
                    config_path: Some(path),
                }
            }
            None => Self::default(),
        })
    }

    /// Returns the project layout configuration.
    pub fn project(&self) -> ProjectConfig {
        self.config
            .as_ref()
            .map(|c| c.project.clone())
            .unwrap_or_default()
    }

    /// Resolves the project root: `cli_root` when given, else the
    /// directory of the loaded config file, else the current directory.
    pub fn project_root(&self, cli_root: Option<&Path>) -> PathBuf {
        let config_dir = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty());
        self.resolve(
            cli_root.map(Path::to_path_buf),
            |_| config_dir.map(Path::to_path_buf),
            PathBuf::from("."),
        )
    }

    /// Builds the layout for the project root resolved from `cli_root`.
    pub fn layout(&self, cli_root: Option<&Path>) -> IosLayout {
        let project = self.project();
        IosLayout {
            root: self.project_root(cli_root),
            marker: project.marker,
            xcodeproj: project.xcodeproj,
            flutter_dir: project.flutter_dir,
            pods_dir: project.pods_dir,
            target: project.target,
        }
    }

    /// Returns the bundle identifier, from the CLI or config.
    pub fn bundle_id(&self, cli_value: Option<String>) -> String {
        self.resolve(
            cli_value,
            |c| Some(c.ios.bundle_id.clone()),
            DEFAULT_BUNDLE_ID.to_string(),
        )
    }

    /// Resolves a CLI value, using config as fallback.
    ///
    /// # Returns
    ///
    /// The resolved value, preferring CLI over config over default.
    pub fn resolve<T, F>(&self, cli_value: Option<T>, config_getter: F, default: T) -> T
    where
        F: FnOnce(&PodfixConfig) -> Option<T>,
    {
        cli_value
            .or_else(|| self.config.as_ref().and_then(config_getter))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PodfixConfig::default();
        assert_eq!(config.project.marker, Path::new("pubspec.yaml"));
        assert_eq!(config.project.xcodeproj, Path::new("ios/Runner.xcodeproj"));
        assert_eq!(config.project.flutter_dir, Path::new("ios/Flutter"));
        assert_eq!(config.project.pods_dir, Path::new("ios/Pods"));
        assert_eq!(config.project.target, "Runner");
        assert_eq!(config.ios.bundle_id, "com.sizelove.adhdapp");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &config_path,
            "[project]\ntarget = \"App\"\nxcodeproj = \"ios/App.xcodeproj\"\n",
        )
        .unwrap();

        let config = PodfixConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.project.target, "App");
        assert_eq!(config.project.xcodeproj, Path::new("ios/App.xcodeproj"));
        assert_eq!(config.project.pods_dir, Path::new("ios/Pods"));
        assert_eq!(config.ios.bundle_id, DEFAULT_BUNDLE_ID);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "[project\n").unwrap();

        let err = PodfixConfig::load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "[ios]\nbundle_id = \"com.example.found\"\n").unwrap();
        let nested = temp_dir.path().join("ios/Runner");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = PodfixConfig::discover_from(&nested).unwrap().unwrap();
        assert_eq!(config.ios.bundle_id, "com.example.found");
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_stops_at_repository_root() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        let repo = temp_dir.path().join("app");
        std::fs::create_dir_all(repo.join(".git")).unwrap();

        let result = PodfixConfig::discover_from(&repo).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_root_follows_config_file_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "").unwrap();
        let nested = temp_dir.path().join("ios");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = PodfixConfig::discover_from(&nested).unwrap().unwrap();
        let resolver = ConfigResolver {
            config: Some(config),
            config_path: Some(path),
        };

        assert_eq!(resolver.project_root(None), temp_dir.path());
        assert_eq!(
            resolver.layout(None).xcodeproj_path(),
            temp_dir.path().join("ios/Runner.xcodeproj")
        );

        // --root still wins
        assert_eq!(
            resolver.project_root(Some(Path::new("elsewhere"))),
            Path::new("elsewhere")
        );
    }

    #[test]
    fn test_root_defaults_to_current_directory() {
        let resolver = ConfigResolver::default();
        assert_eq!(resolver.project_root(None), Path::new("."));

        // A bare file name has no directory component to follow.
        let resolver = ConfigResolver {
            config: Some(PodfixConfig::default()),
            config_path: Some(PathBuf::from(CONFIG_FILE_NAME)),
        };
        assert_eq!(resolver.project_root(None), Path::new("."));
    }

    #[test]
    fn test_starter_toml_parses_to_defaults() {
        let toml = PodfixConfig::generate_starter_toml();
        assert!(toml.contains("xcodeproj = \"ios/Runner.xcodeproj\""));
        assert!(toml.contains("bundle_id = \"com.sizelove.adhdapp\""));

        let parsed: PodfixConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, PodfixConfig::default());
    }

    #[test]
    fn test_config_resolver() {
        let mut config = PodfixConfig::default();
        config.ios.bundle_id = "com.example.config".to_string();
        let resolver = ConfigResolver {
            config: Some(config),
            config_path: None,
        };

        // CLI value takes precedence
        assert_eq!(
            resolver.bundle_id(Some("com.example.cli".to_string())),
            "com.example.cli"
        );

        // Config value used when CLI is None
        assert_eq!(resolver.bundle_id(None), "com.example.config");

        // Built-in default without a config file
        assert_eq!(ConfigResolver::default().bundle_id(None), DEFAULT_BUNDLE_ID);
    }

    #[test]
    fn test_resolver_layout_uses_config_paths() {
        let mut config = PodfixConfig::default();
        config.project.target = "App".to_string();
        config.project.pods_dir = "ios/Vendor/Pods".into();
        let resolver = ConfigResolver {
            config: Some(config),
            config_path: None,
        };

        let layout = resolver.layout(Some(Path::new("/work/app")));
        assert_eq!(layout.root, Path::new("/work/app"));
        assert_eq!(layout.target, "App");
        assert_eq!(layout.pods_dir, Path::new("ios/Vendor/Pods"));
        assert_eq!(layout.flutter_dir, Path::new("ios/Flutter"));
    }
}
