//! Planning of recursive directory uploads.
//!
//! A mirror is executed as a flat list of steps. At every level all child
//! directories are created before any file of that level is written, and only
//! then does the plan descend into the children, in name order. Parents
//! therefore always exist before anything is placed inside them, and the
//! order does not depend on how the host OS enumerates directories.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Error;
use crate::path::RemotePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStep {
    /// `PUT` with an empty body at a directory path
    CreateDirectory(RemotePath),
    /// `PUT` with the full file content
    PutFile { source: PathBuf, target: RemotePath },
}

impl MirrorStep {
    pub fn target(&self) -> &RemotePath {
        match self {
            MirrorStep::CreateDirectory(target) => target,
            MirrorStep::PutFile { target, .. } => target,
        }
    }
}

/// Plan the upload of `source` into the remote directory `target`.
///
/// The first step always creates `target` itself. Symbolic links are skipped.
pub fn plan_mirror(source: &Path, target: &RemotePath) -> Result<Vec<MirrorStep>, Error> {
    let target = target.clone().into_dir();
    let mut steps = vec![MirrorStep::CreateDirectory(target.clone())];
    plan_level(source, &target, &mut steps)?;
    Ok(steps)
}

fn plan_level(dir: &Path, remote: &RemotePath, steps: &mut Vec<MirrorStep>) -> Result<(), Error> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    let children = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in children {
        let entry = entry.map_err(|err| Error::io(dir, err.into()))?;
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| Error::InvalidLocalPath {
                path: entry.path().to_path_buf(),
                message: "file name is not valid UTF-8".to_string(),
            })?
            .to_string();

        let file_type = entry.file_type();
        if file_type.is_dir() {
            subdirs.push((entry.into_path(), remote.join_dir(&name)));
        } else if file_type.is_file() {
            files.push((entry.into_path(), remote.join_file(&name)));
        } else {
            tracing::debug!("skipping {}", entry.path().display());
        }
    }

    steps.extend(
        subdirs
            .iter()
            .map(|(_, target)| MirrorStep::CreateDirectory(target.clone())),
    );
    steps.extend(
        files
            .into_iter()
            .map(|(source, target)| MirrorStep::PutFile { source, target }),
    );

    for (source, target) in subdirs {
        plan_level(&source, &target, steps)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rendered(steps: &[MirrorStep]) -> Vec<String> {
        steps
            .iter()
            .map(|step| match step {
                MirrorStep::CreateDirectory(target) => format!("mkdir {}", target),
                MirrorStep::PutFile { target, .. } => format!("put {}", target),
            })
            .collect()
    }

    #[test]
    fn siblings_before_descent_and_directories_before_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("pkg");
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("z.py"), b"z").unwrap();
        fs::write(root.join("__init__.py"), b"").unwrap();
        fs::write(root.join("a/one.py"), b"1").unwrap();
        fs::write(root.join("b/two.py"), b"2").unwrap();
        fs::write(root.join("b/inner/three.py"), b"3").unwrap();

        let target = RemotePath::library().join_dir("pkg");
        let steps = plan_mirror(&root, &target).unwrap();

        assert_eq!(
            rendered(&steps),
            vec![
                "mkdir fs/lib/pkg/",
                "mkdir fs/lib/pkg/a/",
                "mkdir fs/lib/pkg/b/",
                "put fs/lib/pkg/__init__.py",
                "put fs/lib/pkg/z.py",
                "put fs/lib/pkg/a/one.py",
                "mkdir fs/lib/pkg/b/inner/",
                "put fs/lib/pkg/b/two.py",
                "put fs/lib/pkg/b/inner/three.py",
            ]
        );

        match &steps[3] {
            MirrorStep::PutFile { source, .. } => assert_eq!(source, &root.join("__init__.py")),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn empty_directory_only_creates_target() {
        let tmp = tempfile::tempdir().unwrap();
        let steps = plan_mirror(tmp.path(), &RemotePath::dir("empty")).unwrap();
        assert_eq!(rendered(&steps), vec!["mkdir fs/empty/"]);
    }

    #[test]
    fn target_is_forced_to_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let steps = plan_mirror(tmp.path(), &RemotePath::file("pkg")).unwrap();
        assert_eq!(steps[0].target().to_string(), "fs/pkg/");
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = plan_mirror(&tmp.path().join("nope"), &RemotePath::library()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("real.py"), b"x").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real.py"), tmp.path().join("link.py"))
            .unwrap();

        let steps = plan_mirror(tmp.path(), &RemotePath::dir("pkg")).unwrap();
        assert_eq!(rendered(&steps), vec!["mkdir fs/pkg/", "put fs/pkg/real.py"]);
    }
}
