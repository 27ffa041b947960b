//! Serializes a project back into Xcode's `project.pbxproj` layout.
//!
//! The output mirrors what Xcode writes so that saving a project produces a
//! small diff: objects are grouped into `/* Begin <isa> section */` blocks,
//! `isa` is the first key of every object, references carry a trailing
//! `/* name */` comment, and `PBXBuildFile` / `PBXFileReference` objects are
//! written on a single line.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use crate::plist::{Dictionary, Value, is_bare_char};

const HEADER: &str = "// !$*UTF8*$!\n";

/// Object types Xcode writes on a single line.
const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Keys whose values are object ids that Xcode leaves without a comment.
const UNANNOTATED_KEYS: &[&str] = &["remoteGlobalIDString", "TestTargetID"];

pub(crate) fn to_pbxproj_string(
    root: &Dictionary,
    objects: &Dictionary,
    project_name: &str,
) -> String {
    let mut writer = Writer {
        out: String::from(HEADER),
        comments: annotations(objects, project_name),
    };

    writer.out.push_str("{\n");
    let mut wrote_objects = false;
    for (key, value) in root {
        if !wrote_objects && key.as_str() > "objects" {
            writer.objects_entry(objects);
            wrote_objects = true;
        }
        writer.indent(1);
        writer.string(key);
        writer.out.push_str(" = ");
        writer.value(value, 1, false, true);
        writer.out.push_str(";\n");
    }
    if !wrote_objects {
        writer.objects_entry(objects);
    }
    writer.out.push_str("}\n");
    writer.out
}

struct Writer {
    out: String,
    comments: HashMap<String, String>,
}

impl Writer {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push('\t');
        }
    }

    fn objects_entry(&mut self, objects: &Dictionary) {
        let mut sections: BTreeMap<&str, Vec<(&String, &Value)>> = BTreeMap::new();
        for (id, object) in objects {
            let isa = object
                .as_dictionary()
                .and_then(|obj| obj.get("isa"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            sections.entry(isa).or_default().push((id, object));
        }

        self.indent(1);
        self.out.push_str("objects = {\n");
        for (isa, entries) in sections {
            let inline = INLINE_ISAS.contains(&isa);
            let _ = writeln!(self.out, "\n/* Begin {isa} section */");
            for (id, object) in entries {
                self.indent(2);
                self.scalar(id, true);
                self.out.push_str(" = ");
                self.value(object, 2, inline, true);
                self.out.push_str(";\n");
            }
            let _ = writeln!(self.out, "/* End {isa} section */");
        }
        self.indent(1);
        self.out.push_str("};\n");
    }

    fn value(&mut self, value: &Value, depth: usize, inline: bool, annotate: bool) {
        match value {
            Value::String(s) => self.scalar(s, annotate),
            Value::Array(items) => self.array(items, depth, inline),
            Value::Dictionary(dict) => self.dictionary(dict, depth, inline),
        }
    }

    fn dictionary(&mut self, dict: &Dictionary, depth: usize, inline: bool) {
        self.out.push('{');
        if !inline {
            self.out.push('\n');
        }
        let isa_first = dict
            .get_key_value("isa")
            .into_iter()
            .chain(dict.iter().filter(|(key, _)| key.as_str() != "isa"));
        for (key, value) in isa_first {
            if !inline {
                self.indent(depth + 1);
            }
            self.string(key);
            self.out.push_str(" = ");
            let annotate = !UNANNOTATED_KEYS.contains(&key.as_str());
            self.value(value, depth + 1, inline, annotate);
            self.out.push(';');
            self.out.push(if inline { ' ' } else { '\n' });
        }
        if !inline {
            self.indent(depth);
        }
        self.out.push('}');
    }

    fn array(&mut self, items: &[Value], depth: usize, inline: bool) {
        self.out.push('(');
        if !inline {
            self.out.push('\n');
        }
        for item in items {
            if !inline {
                self.indent(depth + 1);
            }
            self.value(item, depth + 1, inline, true);
            self.out.push(',');
            self.out.push(if inline { ' ' } else { '\n' });
        }
        if !inline {
            self.indent(depth);
        }
        self.out.push(')');
    }

    /// Writes a string value, followed by a comment when it names an object.
    fn scalar(&mut self, s: &str, annotate: bool) {
        self.string(s);
        if annotate && let Some(comment) = self.comments.get(s) {
            let _ = write!(self.out, " /* {comment} */");
        }
    }

    fn string(&mut self, s: &str) {
        if !needs_quotes(s) {
            self.out.push_str(s);
            return;
        }
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                '\r' => self.out.push_str("\\r"),
                other => self.out.push(other),
            }
        }
        self.out.push('"');
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.contains("___")
        || s.chars().any(|c| !is_bare_char(c) || matches!(c, '-' | '+'))
}

/// Builds the `/* ... */` comment Xcode places after each object reference.
fn annotations(objects: &Dictionary, project_name: &str) -> HashMap<String, String> {
    let field = |obj: &Dictionary, key: &str| -> Option<String> {
        obj.get(key).and_then(Value::as_str).map(str::to_string)
    };

    let mut comments = HashMap::new();
    for (id, object) in objects {
        let Some(obj) = object.as_dictionary() else {
            continue;
        };
        let isa = obj.get("isa").and_then(Value::as_str).unwrap_or_default();
        let comment = match isa {
            "PBXProject" => Some("Project object".to_string()),
            "PBXBuildFile" | "XCConfigurationList" => None,
            "PBXSourcesBuildPhase" => Some("Sources".to_string()),
            "PBXFrameworksBuildPhase" => Some("Frameworks".to_string()),
            "PBXResourcesBuildPhase" => Some("Resources".to_string()),
            "PBXHeadersBuildPhase" => Some("Headers".to_string()),
            "PBXShellScriptBuildPhase" => field(obj, "name").or(Some("ShellScript".to_string())),
            "PBXCopyFilesBuildPhase" => field(obj, "name").or(Some("CopyFiles".to_string())),
            "PBXTargetDependency" | "PBXContainerItemProxy" => Some(isa.to_string()),
            _ => field(obj, "name").or_else(|| field(obj, "path")),
        };
        if let Some(comment) = comment {
            comments.insert(id.clone(), comment);
        }
    }

    // Build files and configuration lists are named after their owners.
    let mut derived = Vec::new();
    for object in objects.values() {
        let Some(obj) = object.as_dictionary() else {
            continue;
        };
        let isa = obj.get("isa").and_then(Value::as_str).unwrap_or_default();

        if isa.ends_with("BuildPhase") {
            let phase = field(obj, "name").unwrap_or_else(|| {
                isa.trim_start_matches("PBX")
                    .trim_end_matches("BuildPhase")
                    .to_string()
            });
            let files = obj.get("files").and_then(Value::as_array).unwrap_or_default();
            for build_file in files.iter().filter_map(Value::as_str) {
                let file_name = objects
                    .get(build_file)
                    .and_then(Value::as_dictionary)
                    .and_then(|bf| bf.get("fileRef"))
                    .and_then(Value::as_str)
                    .and_then(|file_ref| comments.get(file_ref))
                    .cloned()
                    .unwrap_or_else(|| "(null)".to_string());
                derived.push((build_file.to_string(), format!("{file_name} in {phase}")));
            }
        }

        if let Some(list) = obj.get("buildConfigurationList").and_then(Value::as_str) {
            let owner = if isa == "PBXProject" {
                project_name.to_string()
            } else {
                field(obj, "name").unwrap_or_default()
            };
            derived.push((
                list.to_string(),
                format!("Build configuration list for {isa} \"{owner}\""),
            ));
        }
    }
    comments.extend(derived);
    comments
}
