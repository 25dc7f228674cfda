// tests/integration_test.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;
use vtrelease::command::{CommandRunner, ToolCommand};
use vtrelease::git::Git2Repository;
use vtrelease::release::{DefaultStageSteps, Stage, StageOptions};
use vtrelease::{ReleaseError, Result};

#[test]
fn test_vtrelease_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_vtrelease"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("vtrelease"));
    assert!(stdout.contains("stage"));
    assert!(stdout.contains("build"));
}

#[test]
fn test_vtrelease_requires_repo() {
    let output = Command::new(env!("CARGO_BIN_EXE_vtrelease"))
        .args(["stage", "--branch", "release-12.0"])
        .env_remove("REPO_PATH")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("--repo"), "stderr: {}", stderr);
}

#[derive(Clone, Default)]
struct RecordingRunner {
    commands: Arc<Mutex<Vec<ToolCommand>>>,
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> Result<()> {
        self.commands.lock().unwrap().push(command.clone());
        Ok(())
    }

    fn locate(&self, program: &str) -> Result<PathBuf> {
        Ok(PathBuf::from("/usr/bin").join(program))
    }
}

fn commit_file(repo: &Repository, root: &Path, name: &str, content: &str, message: &str) -> Oid {
    fs::write(root.join(name), content).expect("Could not write file");

    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new(name))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let sig = repo.signature().expect("Could not get sig");

    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("Could not peel HEAD")],
        Err(_) => vec![],
    };
    let parent_refs: Vec<_> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("Could not create commit")
}

fn tag_commit(repo: &Repository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).expect("Could not find commit");
    let tagger = Signature::now("Test User", "test@example.com").unwrap();
    repo.tag(name, &object, &tagger, &format!("Version {}", name), false)
        .expect("Could not create tag");
}

/// A repository with two releases on release-12.0 and two commits since
fn setup_test_repo() -> TempDir {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("Could not init git repo");

    {
        let mut config = repo.config().expect("Could not get config");
        config
            .set_str("user.name", "Test User")
            .expect("Could not set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Could not set user.email");
    }

    let root = temp_dir.path();
    let first = commit_file(&repo, root, "README.md", "Initial content\n", "Initial commit");
    tag_commit(&repo, "v12.0.0", first);

    let second = commit_file(&repo, root, "README.md", "Fix one\n", "Fix one");
    tag_commit(&repo, "v12.0.1", second);

    commit_file(&repo, root, "README.md", "Fix two\n", "Fix two");
    commit_file(&repo, root, "README.md", "Fix three\n", "Fix three");
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("release-12.0", &head, false)
        .expect("Could not create branch");
    commit_file(&repo, root, "NOTES.md", "wip\n", "Work on main");

    temp_dir
}

fn commit_summary(repo: &Repository, revision: &str) -> String {
    let commit = repo
        .revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .unwrap();
    commit.summary().unwrap().to_string()
}

#[test]
fn test_stage_on_real_repository() {
    let dir = setup_test_repo();
    let runner = RecordingRunner::default();

    let steps = DefaultStageSteps::new()
        .with_repository(Git2Repository::open(dir.path()).unwrap())
        .with_runner(runner.clone());
    let mut stage = Stage::with_steps(StageOptions::new(dir.path(), "release-12.0"), steps);

    let state = stage.run().unwrap();
    assert_eq!(state.release_version().unwrap().to_string(), "v12.0.2");

    let repo = Repository::open(dir.path()).unwrap();
    assert_eq!(
        repo.head().unwrap().shorthand(),
        Some("release-12.0")
    );

    assert_eq!(commit_summary(&repo, "v12.0.2"), "Release commit for v12.0.2");
    assert_eq!(commit_summary(&repo, "HEAD"), "Back to dev mode");
    assert_eq!(commit_summary(&repo, "HEAD~2"), "Fix three");

    let head_message = repo.head().unwrap().peel_to_commit().unwrap();
    assert!(head_message
        .message()
        .unwrap()
        .contains("Signed-off-by: Test User <test@example.com>"));

    // The work on main never reached the release branch
    assert!(!dir.path().join("NOTES.md").exists());

    let version_file = fs::read_to_string(dir.path().join("go/vt/servenv/version.go")).unwrap();
    assert!(version_file.contains("\"12.0.3-SNAPSHOT\""));

    let tags = repo.tag_names(None).unwrap();
    let tags: Vec<&str> = tags.iter().flatten().collect();
    assert!(tags.contains(&"v12.0.2"));
    assert!(!tags.iter().any(|t| t.contains("SNAPSHOT")));
}

#[test]
fn test_release_notes_range_on_real_repository() {
    let dir = setup_test_repo();
    let runner = RecordingRunner::default();

    let steps = DefaultStageSteps::new()
        .with_repository(Git2Repository::open(dir.path()).unwrap())
        .with_runner(runner.clone());
    let mut stage = Stage::with_steps(StageOptions::new(dir.path(), "release-12.0"), steps);
    stage.run().unwrap();

    let repo = Repository::open(dir.path()).unwrap();
    let from = repo
        .revparse_single("v12.0.1")
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id()
        .to_string();
    let to = repo
        .revparse_single("v12.0.2~2")
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id()
        .to_string();

    let commands = runner.commands.lock().unwrap();
    let generator = commands.iter().find(|c| c.program == "go").unwrap();
    assert!(generator.args.windows(2).any(|w| w[0] == "-from" && w[1] == from));
    assert!(generator.args.windows(2).any(|w| w[0] == "-to" && w[1] == to));
}

#[test]
fn test_no_commits_since_last_release_is_rejected() {
    let dir = setup_test_repo();
    {
        let repo = Repository::open(dir.path()).unwrap();
        let head = repo
            .revparse_single("release-12.0")
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .id();
        tag_commit(&repo, "v12.0.2", head);
    }
    let runner = RecordingRunner::default();

    let steps = DefaultStageSteps::new()
        .with_repository(Git2Repository::open(dir.path()).unwrap())
        .with_runner(runner.clone());
    let mut stage = Stage::with_steps(StageOptions::new(dir.path(), "release-12.0"), steps);

    let err = stage.run().unwrap_err();
    assert!(matches!(err.root(), ReleaseError::CommitRange(_)), "got: {}", err);
    assert!(runner.commands.lock().unwrap().is_empty());

    let repo = Repository::open(dir.path()).unwrap();
    assert_eq!(commit_summary(&repo, "release-12.0"), "Fix three");
    assert!(repo.revparse_single("v12.0.3").is_err());
}

#[test]
fn test_second_run_cuts_next_patch() {
    let dir = setup_test_repo();

    for expected in ["v12.0.2", "v12.0.3"] {
        if expected != "v12.0.2" {
            let repo = Repository::open(dir.path()).unwrap();
            commit_file(&repo, dir.path(), "README.md", "Fix four\n", "Fix four");
        }

        let steps = DefaultStageSteps::new()
            .with_repository(Git2Repository::open(dir.path()).unwrap())
            .with_runner(RecordingRunner::default());
        let mut stage = Stage::with_steps(StageOptions::new(dir.path(), "release-12.0"), steps);

        let state = stage.run().unwrap();
        assert_eq!(state.release_version().unwrap().to_string(), expected);
    }
}
