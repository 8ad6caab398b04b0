//! Writes a generation into a project directory.
//!
//! `Objects/` holds one `.h`/`.m` pair per object. Existing pairs are kept
//! unless overwriting is forced, and files left over from a previous run that
//! this run no longer produces are deleted. `Machine/MachineDataModel.{h,m}`
//! are always rewritten.

use crate::Generation;
use crate::error::ManticomError;
use crate::settings::GenerateSettings;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const OBJECTS_DIR: &str = "Objects";
pub const MACHINE_DIR: &str = "Machine";

/// File names touched by one write, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub added: Vec<String>,
    pub overwritten: Vec<String>,
    pub skipped: Vec<String>,
    pub deleted: Vec<String>,
}

/// Writes all generated files below `project_dir`.
///
/// # Errors
///
/// Returns `ManticomError::GenericError` if `project_dir` exists but is not a
/// directory, and `ManticomError::IoError` if a directory cannot be created or
/// listed, or a file cannot be written or removed.
pub fn write_project(
    project_dir: &Path,
    generation: &Generation,
    settings: &GenerateSettings,
) -> Result<WriteReport, ManticomError> {
    if project_dir.exists() && !project_dir.is_dir() {
        return Err(format!("project directory {} is not a directory", project_dir.display()).into());
    }
    let objects_dir: PathBuf = project_dir.join(OBJECTS_DIR);
    fs::create_dir_all(&objects_dir)?;

    let previous: BTreeSet<String> = list_files(&objects_dir)?;
    let mut current: BTreeSet<String> = BTreeSet::new();
    let mut report = WriteReport::default();

    for files in &generation.objects {
        let pair: [(String, &str); 2] = [
            (files.header_file_name(), files.header.as_str()),
            (files.body_file_name(), files.body.as_str()),
        ];
        for (name, contents) in pair {
            let path: PathBuf = objects_dir.join(&name);
            if previous.contains(&name) {
                if settings.force_overwrite {
                    fs::write(&path, contents)?;
                    tracing::info!(file = %name, "overwriting");
                    report.overwritten.push(name.clone());
                } else {
                    tracing::info!(file = %name, "skipping");
                    report.skipped.push(name.clone());
                }
            } else {
                fs::write(&path, contents)?;
                tracing::info!(file = %name, "adding");
                report.added.push(name.clone());
            }
            current.insert(name);
        }
    }

    for stale in previous.difference(&current) {
        fs::remove_file(objects_dir.join(stale))?;
        tracing::info!(file = %stale, "deleted");
        report.deleted.push(stale.clone());
    }

    let machine_dir: PathBuf = project_dir.join(MACHINE_DIR);
    fs::create_dir_all(&machine_dir)?;
    fs::write(
        machine_dir.join("MachineDataModel.h"),
        &generation.data_model_header,
    )?;
    fs::write(
        machine_dir.join("MachineDataModel.m"),
        &generation.data_model_body,
    )?;
    tracing::debug!(dir = %machine_dir.display(), "wrote data model");

    report.added.sort();
    report.overwritten.sort();
    report.skipped.sort();
    Ok(report)
}

fn list_files(dir: &Path) -> Result<BTreeSet<String>, ManticomError> {
    let mut names: BTreeSet<String> = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let entry: fs::DirEntry = entry?;
        if entry.file_type()?.is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::ObjectFiles;

    fn object(class_name: &str, marker: &str) -> ObjectFiles {
        ObjectFiles {
            class_name: class_name.to_string(),
            header: format!("// {marker} header\n"),
            body: format!("// {marker} body\n"),
        }
    }

    fn generation(objects: Vec<ObjectFiles>) -> Generation {
        Generation {
            objects,
            data_model_header: "// model header\n".to_string(),
            data_model_body: "// model body\n".to_string(),
            issues: Vec::new(),
        }
    }

    #[test]
    fn fresh_project_gets_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let report: WriteReport = write_project(
            dir.path(),
            &generation(vec![object("User", "v1"), object("Tag", "v1")]),
            &GenerateSettings::default(),
        )
        .unwrap();

        assert_eq!(report.added, vec!["Tag.h", "Tag.m", "User.h", "User.m"]);
        assert!(report.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("Objects/User.m")).unwrap(),
            "// v1 body\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Machine/MachineDataModel.h")).unwrap(),
            "// model header\n"
        );
    }

    #[test]
    fn existing_object_files_are_kept_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GenerateSettings::default();
        write_project(dir.path(), &generation(vec![object("User", "v1")]), &settings).unwrap();

        let mut changed: Generation = generation(vec![object("User", "v2")]);
        changed.data_model_body = "// model body v2\n".to_string();
        let report: WriteReport = write_project(dir.path(), &changed, &settings).unwrap();

        assert_eq!(report.skipped, vec!["User.h", "User.m"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("Objects/User.h")).unwrap(),
            "// v1 header\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Machine/MachineDataModel.m")).unwrap(),
            "// model body v2\n"
        );
    }

    #[test]
    fn force_overwrites_existing_object_files() {
        let dir = tempfile::tempdir().unwrap();
        write_project(
            dir.path(),
            &generation(vec![object("User", "v1")]),
            &GenerateSettings::default(),
        )
        .unwrap();

        let settings = GenerateSettings {
            force_overwrite: true,
            ..GenerateSettings::default()
        };
        let report: WriteReport =
            write_project(dir.path(), &generation(vec![object("User", "v2")]), &settings).unwrap();

        assert_eq!(report.overwritten, vec!["User.h", "User.m"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("Objects/User.h")).unwrap(),
            "// v2 header\n"
        );
    }

    #[test]
    fn project_dir_that_is_a_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file: PathBuf = dir.path().join("App");
        fs::write(&file, "not a directory").unwrap();

        let result = write_project(&file, &generation(Vec::new()), &GenerateSettings::default());

        let Err(ManticomError::GenericError(message)) = &result else {
            panic!("expected a generic error, got {result:?}");
        };
        assert!(message.ends_with("is not a directory"), "{message}");
    }

    #[test]
    fn files_no_longer_generated_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GenerateSettings::default();
        write_project(
            dir.path(),
            &generation(vec![object("User", "v1"), object("Legacy", "v1")]),
            &settings,
        )
        .unwrap();
        fs::write(dir.path().join("Objects/notes.txt"), "hand written").unwrap();

        let report: WriteReport =
            write_project(dir.path(), &generation(vec![object("User", "v1")]), &settings).unwrap();

        assert_eq!(report.deleted, vec!["Legacy.h", "Legacy.m", "notes.txt"]);
        assert!(!dir.path().join("Objects/Legacy.h").exists());
        assert!(dir.path().join("Objects/User.h").exists());
    }
}
