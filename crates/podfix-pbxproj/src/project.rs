//! Typed access to the objects of an Xcode project.
//!
//! [`Project`] owns the parsed property list. The handle types returned by
//! its queries ([`Target`], [`BuildConfiguration`], [`FileReference`]) are
//! snapshots carrying the object id; mutations always go through the
//! project so that nothing outlives an unsaved edit.

use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::plist::{self, Dictionary, Value};
use crate::{PBXPROJ_FILE, PbxError, writer};

/// A build target (`PBXNativeTarget`, `PBXAggregateTarget`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub name: String,
}

/// An `XCBuildConfiguration` owned by a target or the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub id: String,
    pub name: String,
}

/// A `PBXFileReference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub id: String,
    /// Path as recorded in the project, relative to its source tree.
    pub path: Option<String>,
    pub name: Option<String>,
}

/// An opened `.xcodeproj` bundle.
///
/// Mutations are applied in memory only. Call [`Project::save`] to write
/// them back to `project.pbxproj`; a project dropped without saving leaves
/// the file on disk untouched.
#[derive(Debug, Clone)]
pub struct Project {
    path: PathBuf,
    root: Dictionary,
    objects: Dictionary,
}

impl Project {
    /// Opens the bundle at `path` (the `.xcodeproj` directory).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PbxError> {
        let path = path.as_ref();
        let file = path.join(PBXPROJ_FILE);
        let contents = fs::read_to_string(&file).map_err(|source| PbxError::Read {
            path: file.clone(),
            source,
        })?;
        let project = Self::from_contents(path, &contents).map_err(|err| match err {
            PbxError::Parse { line, message, .. } => PbxError::Parse {
                path: file.clone(),
                line,
                message,
            },
            other => other,
        })?;
        debug!(
            path = %file.display(),
            objects = project.objects.len(),
            "opened project"
        );
        Ok(project)
    }

    /// Builds a project from `project.pbxproj` contents without touching
    /// the filesystem. `path` is where [`Project::save`] will write.
    pub fn from_contents(path: impl Into<PathBuf>, contents: &str) -> Result<Self, PbxError> {
        let path = path.into();
        let mut root = match plist::parse(contents) {
            Ok(Value::Dictionary(root)) => root,
            Ok(_) => {
                return Err(PbxError::Malformed(
                    "top-level value is not a dictionary".to_string(),
                ));
            }
            Err(err) => {
                return Err(PbxError::Parse {
                    path: path.join(PBXPROJ_FILE),
                    line: err.line,
                    message: err.message,
                });
            }
        };

        let objects = match root.remove("objects") {
            Some(Value::Dictionary(objects)) => objects,
            Some(_) => {
                return Err(PbxError::Malformed(
                    "`objects` is not a dictionary".to_string(),
                ));
            }
            None => return Err(PbxError::Malformed("missing `objects`".to_string())),
        };

        let project = Self {
            path,
            root,
            objects,
        };
        project.root_object()?;
        Ok(project)
    }

    /// Path of the `.xcodeproj` bundle.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project name, taken from the bundle's file stem (`Runner` for
    /// `Runner.xcodeproj`).
    pub fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }

    /// Directory that group-relative paths in the project resolve against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Number of objects in the project graph.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn object(&self, id: &str) -> Option<&Dictionary> {
        self.objects.get(id).and_then(Value::as_dictionary)
    }

    fn object_mut(&mut self, id: &str) -> Option<&mut Dictionary> {
        self.objects.get_mut(id).and_then(Value::as_dictionary_mut)
    }

    fn require_object(&self, id: &str, referrer: &str) -> Result<&Dictionary, PbxError> {
        self.object(id).ok_or_else(|| PbxError::MissingObject {
            id: id.to_string(),
            referrer: referrer.to_string(),
        })
    }

    fn root_object(&self) -> Result<&Dictionary, PbxError> {
        let id = self
            .root
            .get("rootObject")
            .and_then(Value::as_str)
            .ok_or_else(|| PbxError::Malformed("missing `rootObject`".to_string()))?;
        self.require_object(id, "rootObject")
    }

    /// Targets in the order the project lists them.
    pub fn targets(&self) -> Result<Vec<Target>, PbxError> {
        let ids = self
            .root_object()?
            .get("targets")
            .and_then(Value::as_array)
            .unwrap_or_default();

        ids.iter()
            .filter_map(Value::as_str)
            .map(|id| {
                let target = self.require_object(id, "PBXProject.targets")?;
                Ok(Target {
                    id: id.to_string(),
                    name: string_field(target, "name").unwrap_or_default().to_string(),
                })
            })
            .collect()
    }

    /// Finds the target named `name` (exact match).
    pub fn find_target(&self, name: &str) -> Result<Target, PbxError> {
        self.targets()?
            .into_iter()
            .find(|target| target.name == name)
            .ok_or_else(|| PbxError::TargetNotFound(name.to_string()))
    }

    /// Build configurations of `target`, in configuration-list order.
    pub fn build_configurations(
        &self,
        target: &Target,
    ) -> Result<Vec<BuildConfiguration>, PbxError> {
        let target_obj = self.require_object(&target.id, &target.name)?;
        let Some(list_id) = string_field(target_obj, "buildConfigurationList") else {
            return Ok(Vec::new());
        };
        let list = self.require_object(list_id, &target.name)?;
        let ids = list
            .get("buildConfigurations")
            .and_then(Value::as_array)
            .unwrap_or_default();

        ids.iter()
            .filter_map(Value::as_str)
            .map(|id| {
                let config = self.require_object(id, list_id)?;
                Ok(BuildConfiguration {
                    id: id.to_string(),
                    name: string_field(config, "name").unwrap_or_default().to_string(),
                })
            })
            .collect()
    }

    /// Finds the configuration of `target` whose name is exactly `name`.
    pub fn find_build_configuration(
        &self,
        target: &Target,
        name: &str,
    ) -> Result<Option<BuildConfiguration>, PbxError> {
        Ok(self
            .build_configurations(target)?
            .into_iter()
            .find(|config| config.name == name))
    }

    /// All file references in the project.
    pub fn files(&self) -> Vec<FileReference> {
        self.objects
            .iter()
            .filter_map(|(id, object)| {
                let obj = object.as_dictionary()?;
                (string_field(obj, "isa") == Some("PBXFileReference"))
                    .then(|| file_reference(id, obj))
            })
            .collect()
    }

    /// Finds a file reference whose recorded `path` equals `path`.
    pub fn find_file_by_path(&self, path: &str) -> Option<FileReference> {
        self.files()
            .into_iter()
            .find(|file| file.path.as_deref() == Some(path))
    }

    /// Registers a new file reference for `path` (relative to the project's
    /// base directory) and adds it to the main group.
    pub fn new_file(&mut self, path: &str) -> Result<FileReference, PbxError> {
        let main_group = string_field(self.root_object()?, "mainGroup")
            .ok_or_else(|| PbxError::Malformed("PBXProject has no `mainGroup`".to_string()))?
            .to_string();
        if self.object(&main_group).is_none() {
            return Err(PbxError::MissingObject {
                id: main_group,
                referrer: "PBXProject.mainGroup".to_string(),
            });
        }

        let id = self.generate_id(path);
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut file = Dictionary::new();
        file.insert("isa".into(), "PBXFileReference".into());
        file.insert("lastKnownFileType".into(), file_type(path).into());
        if name != path {
            file.insert("name".into(), name.into());
        }
        file.insert("path".into(), path.into());
        file.insert("sourceTree".into(), "<group>".into());
        self.objects.insert(id.clone(), Value::Dictionary(file));

        let group = self
            .object_mut(&main_group)
            .ok_or_else(|| PbxError::MissingObject {
                id: main_group.clone(),
                referrer: "PBXProject.mainGroup".to_string(),
            })?;
        match group
            .entry("children".to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
        {
            Some(children) => children.push(Value::from(id.as_str())),
            None => {
                return Err(PbxError::Malformed(format!(
                    "children of group {main_group} is not an array"
                )));
            }
        }

        debug!(%id, path, "created file reference");
        Ok(FileReference {
            id,
            path: Some(path.to_string()),
            name: (name != path).then(|| name.to_string()),
        })
    }

    /// The base configuration file of `config`, if one is set.
    pub fn base_configuration(&self, config: &BuildConfiguration) -> Option<FileReference> {
        let file_id = string_field(self.object(&config.id)?, "baseConfigurationReference")?;
        self.object(file_id).map(|obj| file_reference(file_id, obj))
    }

    /// Sets `file` as the base configuration file of `config`.
    pub fn set_base_configuration(
        &mut self,
        config: &BuildConfiguration,
        file: &FileReference,
    ) -> Result<(), PbxError> {
        if self.object(&file.id).is_none() {
            return Err(PbxError::MissingObject {
                id: file.id.clone(),
                referrer: config.name.clone(),
            });
        }
        let obj = self.config_mut(config)?;
        obj.insert(
            "baseConfigurationReference".into(),
            Value::from(file.id.as_str()),
        );
        debug!(config = %config.name, file = ?file.path, "set base configuration");
        Ok(())
    }

    /// Reads a string build setting from `config`.
    pub fn build_setting(&self, config: &BuildConfiguration, key: &str) -> Option<&str> {
        self.object(&config.id)?
            .get("buildSettings")?
            .as_dictionary()?
            .get(key)?
            .as_str()
    }

    /// Sets a string build setting on `config`, replacing any previous value.
    pub fn set_build_setting(
        &mut self,
        config: &BuildConfiguration,
        key: &str,
        value: &str,
    ) -> Result<(), PbxError> {
        let obj = self.config_mut(config)?;
        let settings = obj
            .entry("buildSettings".to_string())
            .or_insert_with(|| Value::Dictionary(Dictionary::new()))
            .as_dictionary_mut()
            .ok_or_else(|| {
                PbxError::Malformed(format!("buildSettings of {} is not a dictionary", config.name))
            })?;
        settings.insert(key.to_string(), Value::from(value));
        Ok(())
    }

    fn config_mut(&mut self, config: &BuildConfiguration) -> Result<&mut Dictionary, PbxError> {
        self.object_mut(&config.id)
            .ok_or_else(|| PbxError::MissingObject {
                id: config.id.clone(),
                referrer: config.name.clone(),
            })
    }

    /// Renders the project in `project.pbxproj` format.
    pub fn to_pbxproj_string(&self) -> String {
        writer::to_pbxproj_string(&self.root, &self.objects, self.name())
    }

    /// Writes the project back to `<bundle>/project.pbxproj`.
    pub fn save(&self) -> Result<(), PbxError> {
        let file = self.path.join(PBXPROJ_FILE);
        fs::write(&file, self.to_pbxproj_string()).map_err(|source| PbxError::Write {
            path: file.clone(),
            source,
        })?;
        debug!(path = %file.display(), "saved project");
        Ok(())
    }

    /// Derives a fresh 24-character object id from `seed` and the current
    /// object count, skipping ids already in use.
    fn generate_id(&self, seed: &str) -> String {
        let mut counter = self.objects.len() as u64;
        loop {
            let mut hasher = DefaultHasher::new();
            self.name().hash(&mut hasher);
            seed.hash(&mut hasher);
            counter.hash(&mut hasher);
            let high = hasher.finish();
            counter.hash(&mut hasher);
            let low = hasher.finish();

            let id = format!("{high:016X}{:08X}", low as u32);
            if !self.objects.contains_key(&id) {
                return id;
            }
            counter += 1;
        }
    }
}

fn string_field<'a>(obj: &'a Dictionary, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn file_reference(id: &str, obj: &Dictionary) -> FileReference {
    FileReference {
        id: id.to_string(),
        path: string_field(obj, "path").map(str::to_string),
        name: string_field(obj, "name").map(str::to_string),
    }
}

/// `lastKnownFileType` for the extensions podfix registers.
fn file_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("xcconfig") => "text.xcconfig",
        Some("plist") => "text.plist.xml",
        Some("swift") => "sourcecode.swift",
        Some("h") => "sourcecode.c.h",
        Some("m") => "sourcecode.c.objc",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURE: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 54;
	objects = {

/* Begin PBXFileReference section */
		1111111111111111111111A1 /* Info.plist */ = {isa = PBXFileReference; lastKnownFileType = text.plist.xml; path = Info.plist; sourceTree = "<group>"; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
		1111111111111111111111A2 = {
			isa = PBXGroup;
			children = (
				1111111111111111111111A1 /* Info.plist */,
			);
			sourceTree = "<group>";
		};
/* End PBXGroup section */

/* Begin PBXNativeTarget section */
		1111111111111111111111A3 /* Runner */ = {
			isa = PBXNativeTarget;
			buildConfigurationList = 1111111111111111111111A4 /* Build configuration list for PBXNativeTarget "Runner" */;
			name = Runner;
			productType = "com.apple.product-type.application";
		};
		1111111111111111111111B3 /* RunnerTests */ = {
			isa = PBXNativeTarget;
			name = RunnerTests;
		};
/* End PBXNativeTarget section */

/* Begin PBXProject section */
		1111111111111111111111A0 /* Project object */ = {
			isa = PBXProject;
			mainGroup = 1111111111111111111111A2;
			targets = (
				1111111111111111111111A3 /* Runner */,
				1111111111111111111111B3 /* RunnerTests */,
			);
		};
/* End PBXProject section */

/* Begin XCBuildConfiguration section */
		1111111111111111111111A5 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				PRODUCT_BUNDLE_IDENTIFIER = com.example.app;
			};
			name = Debug;
		};
		1111111111111111111111A6 /* Release */ = {
			isa = XCBuildConfiguration;
			name = Release;
		};
/* End XCBuildConfiguration section */

/* Begin XCConfigurationList section */
		1111111111111111111111A4 /* Build configuration list for PBXNativeTarget "Runner" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				1111111111111111111111A5 /* Debug */,
				1111111111111111111111A6 /* Release */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Release;
		};
/* End XCConfigurationList section */
	};
	rootObject = 1111111111111111111111A0 /* Project object */;
}
"#;

    fn fixture_project() -> Project {
        Project::from_contents("ios/Runner.xcodeproj", FIXTURE).unwrap()
    }

    #[test]
    fn lists_targets_in_project_order() {
        let project = fixture_project();
        let names: Vec<_> = project
            .targets()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["Runner", "RunnerTests"]);
        assert_eq!(project.name(), "Runner");
        assert_eq!(project.base_dir(), Path::new("ios"));
    }

    #[test]
    fn missing_target_is_an_error() {
        let project = fixture_project();
        let err = project.find_target("Missing").unwrap_err();
        assert!(matches!(err, PbxError::TargetNotFound(ref name) if name == "Missing"));
        assert_eq!(err.to_string(), "Missing target not found");
    }

    #[test]
    fn target_without_configuration_list_has_no_configurations() {
        let project = fixture_project();
        let tests = project.find_target("RunnerTests").unwrap();
        assert!(project.build_configurations(&tests).unwrap().is_empty());
    }

    #[test]
    fn configuration_lookup_is_case_sensitive() {
        let project = fixture_project();
        let runner = project.find_target("Runner").unwrap();
        assert!(
            project
                .find_build_configuration(&runner, "Debug")
                .unwrap()
                .is_some()
        );
        assert!(
            project
                .find_build_configuration(&runner, "debug")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn new_file_registers_reference_in_main_group() {
        let mut project = fixture_project();
        let before = project.object_count();
        let file = project.new_file("Flutter/Debug.xcconfig").unwrap();

        assert_eq!(project.object_count(), before + 1);
        assert_eq!(file.id.len(), 24);
        assert_eq!(file.name.as_deref(), Some("Debug.xcconfig"));
        assert_eq!(
            project.find_file_by_path("Flutter/Debug.xcconfig"),
            Some(file.clone())
        );

        let group = project.object("1111111111111111111111A2").unwrap();
        let children = group["children"].as_array().unwrap();
        assert_eq!(children.last(), Some(&Value::from(file.id.as_str())));

        let obj = project.object(&file.id).unwrap();
        assert_eq!(string_field(obj, "lastKnownFileType"), Some("text.xcconfig"));
        assert_eq!(string_field(obj, "sourceTree"), Some("<group>"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut project = fixture_project();
        let a = project.new_file("Flutter/Debug.xcconfig").unwrap();
        let b = project.new_file("Flutter/Debug.xcconfig").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn base_configuration_round_trip() {
        let mut project = fixture_project();
        let runner = project.find_target("Runner").unwrap();
        let debug = project
            .find_build_configuration(&runner, "Debug")
            .unwrap()
            .unwrap();
        assert!(project.base_configuration(&debug).is_none());

        let file = project.new_file("Flutter/Debug.xcconfig").unwrap();
        project.set_base_configuration(&debug, &file).unwrap();
        assert_eq!(project.base_configuration(&debug), Some(file));
    }

    #[test]
    fn set_build_setting_creates_and_overwrites() {
        let mut project = fixture_project();
        let runner = project.find_target("Runner").unwrap();
        for config in project.build_configurations(&runner).unwrap() {
            project
                .set_build_setting(&config, "PRODUCT_BUNDLE_IDENTIFIER", "com.example.other")
                .unwrap();
        }
        for config in project.build_configurations(&runner).unwrap() {
            assert_eq!(
                project.build_setting(&config, "PRODUCT_BUNDLE_IDENTIFIER"),
                Some("com.example.other")
            );
        }
    }

    #[test]
    fn save_persists_and_reopen_reads_changes() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("Runner.xcodeproj");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join(PBXPROJ_FILE), FIXTURE).unwrap();

        let mut project = Project::open(&bundle).unwrap();
        let runner = project.find_target("Runner").unwrap();
        let release = project
            .find_build_configuration(&runner, "Release")
            .unwrap()
            .unwrap();
        project
            .set_build_setting(&release, "PRODUCT_BUNDLE_IDENTIFIER", "com.example.saved")
            .unwrap();
        project.save().unwrap();

        let reopened = Project::open(&bundle).unwrap();
        assert_eq!(
            reopened.build_setting(&release, "PRODUCT_BUNDLE_IDENTIFIER"),
            Some("com.example.saved")
        );
        assert_eq!(reopened.object_count(), project.object_count());
    }

    #[test]
    fn unsaved_changes_are_discarded() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("Runner.xcodeproj");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join(PBXPROJ_FILE), FIXTURE).unwrap();

        {
            let mut project = Project::open(&bundle).unwrap();
            project.new_file("Flutter/Debug.xcconfig").unwrap();
        }

        let on_disk = fs::read_to_string(bundle.join(PBXPROJ_FILE)).unwrap();
        assert_eq!(on_disk, FIXTURE);
    }

    #[test]
    fn open_reports_parse_errors_with_file_and_line() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("Broken.xcodeproj");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join(PBXPROJ_FILE), "{\n objects = {\n  a = ;\n };\n}").unwrap();

        match Project::open(&bundle).unwrap_err() {
            PbxError::Parse { path, line, .. } => {
                assert_eq!(path, bundle.join(PBXPROJ_FILE));
                assert_eq!(line, 3);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn open_missing_bundle_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path().join("Nope.xcodeproj")).unwrap_err();
        assert!(matches!(err, PbxError::Read { .. }));
    }

    #[test]
    fn read_error_message_leaves_cause_to_source() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("Nope.xcodeproj");
        let err = Project::open(&bundle).unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("failed to read {}", bundle.join(PBXPROJ_FILE).display())
        );
        let cause = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<std::io::Error>())
            .unwrap();
        assert_eq!(cause.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn rejects_property_list_without_objects() {
        let err = Project::from_contents("Runner.xcodeproj", "{ rootObject = X; }").unwrap_err();
        assert!(matches!(err, PbxError::Malformed(_)));
    }
}
