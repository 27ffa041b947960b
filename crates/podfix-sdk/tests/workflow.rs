//! Fix, install, verify: the sequence a developer runs after Xcode drops
//! the Flutter base configurations.

use std::fs;
use std::path::Path;

use podfix_sdk::podfix_pbxproj::Project;
use podfix_sdk::{
    BUNDLE_ID_SETTING, BuildFlavor, IncludeStatus, IosLayout, link_base_configurations,
    set_bundle_identifier, verify, write_include_files,
};
use tempfile::TempDir;

const RUNNER_PBXPROJ: &str = include_str!("fixtures/project.pbxproj");

fn flutter_project(root: &Path) -> IosLayout {
    let layout = IosLayout {
        root: root.to_path_buf(),
        marker: "pubspec.yaml".into(),
        xcodeproj: "ios/Runner.xcodeproj".into(),
        flutter_dir: "ios/Flutter".into(),
        pods_dir: "ios/Pods".into(),
        target: "Runner".into(),
    };
    fs::write(layout.marker_path(), "name: adhd_app\n").unwrap();
    fs::create_dir_all(layout.xcodeproj_path()).unwrap();
    fs::write(
        layout.xcodeproj_path().join("project.pbxproj"),
        RUNNER_PBXPROJ,
    )
    .unwrap();
    layout
}

fn pod_install(layout: &IosLayout) {
    for flavor in BuildFlavor::ALL {
        let path = layout.resolve(layout.pods_support_file(flavor));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "FRAMEWORK_SEARCH_PATHS = $(inherited)\n").unwrap();
    }
}

#[test]
fn fix_then_verify_fails_only_on_support_files() {
    let temp = TempDir::new().unwrap();
    let layout = flutter_project(temp.path());

    write_include_files(&layout).unwrap();
    link_base_configurations(&layout).unwrap();

    let report = verify(&layout).unwrap();
    assert!(!report.passed());
    assert!(
        report
            .include_files
            .iter()
            .all(|check| check.status == IncludeStatus::Ok)
    );
    assert!(report.support_files.iter().all(|check| !check.exists));

    pod_install(&layout);

    let report = verify(&layout).unwrap();
    assert!(report.passed());
}

#[test]
fn fixing_twice_is_stable() {
    let temp = TempDir::new().unwrap();
    let layout = flutter_project(temp.path());
    let pbxproj = layout.xcodeproj_path().join("project.pbxproj");

    write_include_files(&layout).unwrap();
    link_base_configurations(&layout).unwrap();
    let first = fs::read_to_string(&pbxproj).unwrap();

    write_include_files(&layout).unwrap();
    link_base_configurations(&layout).unwrap();
    let second = fs::read_to_string(&pbxproj).unwrap();

    assert_eq!(first, second);
}

#[test]
fn rewritten_project_keeps_unrelated_content() {
    let temp = TempDir::new().unwrap();
    let layout = flutter_project(temp.path());
    let before = Project::open(layout.xcodeproj_path()).unwrap();

    link_base_configurations(&layout).unwrap();
    let after = Project::open(layout.xcodeproj_path()).unwrap();

    // Three new file references, nothing else added or lost.
    assert_eq!(after.object_count(), before.object_count() + 3);
    assert_eq!(
        after.targets().unwrap(),
        before.targets().unwrap()
    );

    let text = fs::read_to_string(layout.xcodeproj_path().join("project.pbxproj")).unwrap();
    assert!(text.starts_with("// !$*UTF8*$!\n"));
    assert!(text.contains("xcode_backend.sh"));
    assert!(text.contains("/* Begin XCBuildConfiguration section */"));
}

#[test]
fn bundle_identifier_survives_a_later_fix() {
    let temp = TempDir::new().unwrap();
    let layout = flutter_project(temp.path());

    set_bundle_identifier(&layout.xcodeproj_path(), "Runner", "com.example.app").unwrap();
    link_base_configurations(&layout).unwrap();

    let project = Project::open(layout.xcodeproj_path()).unwrap();
    let target = project.find_target("Runner").unwrap();
    for config in project.build_configurations(&target).unwrap() {
        assert_eq!(
            project.build_setting(&config, BUNDLE_ID_SETTING),
            Some("com.example.app")
        );
    }
}
