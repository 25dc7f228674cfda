use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;
use serial_test::serial;
use vtrelease::cli::orchestration::{build_options, require_repo, stage_options};
use vtrelease::cli::{BuildCommand, Cli, Command, ImageArgs, StageArgs};
use vtrelease::config::Config;
use vtrelease::ReleaseError;

#[test]
#[serial]
fn test_parse_stage_command() {
    env::remove_var("REPO_PATH");
    let cli = Cli::try_parse_from([
        "vtrelease",
        "--repo",
        "/src/vitess",
        "stage",
        "--branch",
        "release-12.0",
        "--godoc-version",
        "v0.12.2",
    ])
    .unwrap();

    assert_eq!(cli.repo, Some(PathBuf::from("/src/vitess")));
    assert_eq!(cli.log_level, "info");
    match cli.command {
        Command::Stage(args) => {
            assert_eq!(args.branch, "release-12.0");
            assert_eq!(args.godoc_version.as_deref(), Some("v0.12.2"));
        }
        other => panic!("expected stage command, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_stage_requires_branch() {
    let result = Cli::try_parse_from(["vtrelease", "--repo", "/src/vitess", "stage"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_repo_from_environment() {
    env::set_var("REPO_PATH", "/env/vitess");
    let cli = Cli::try_parse_from(["vtrelease", "stage", "-b", "release-12.0"]).unwrap();
    env::remove_var("REPO_PATH");

    assert_eq!(cli.repo, Some(PathBuf::from("/env/vitess")));
}

#[test]
#[serial]
fn test_parse_build_image_command() {
    env::remove_var("VT_BASE_VER");
    let cli = Cli::try_parse_from([
        "vtrelease",
        "build",
        "image",
        "lite",
        "--version",
        "v12.0.4",
        "--distribution",
        "bullseye",
        "--repo",
        "/src/vitess",
    ])
    .unwrap();

    assert_eq!(cli.repo, Some(PathBuf::from("/src/vitess")));
    match cli.command {
        Command::Build(BuildCommand::Image(args)) => {
            assert_eq!(args.name, "lite");
            assert_eq!(args.version, "v12.0.4");
            assert_eq!(args.distributions, vec!["bullseye".to_string()]);
            assert_eq!(args.staging_registry, None);
        }
        other => panic!("expected build image command, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_image_version_from_environment() {
    env::set_var("VT_BASE_VER", "v12.0.5");
    let cli = Cli::try_parse_from(["vtrelease", "build", "image", "lite"]).unwrap();
    env::remove_var("VT_BASE_VER");

    match cli.command {
        Command::Build(BuildCommand::Image(args)) => assert_eq!(args.version, "v12.0.5"),
        other => panic!("expected build image command, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_image_version_is_required() {
    env::remove_var("VT_BASE_VER");
    let result = Cli::try_parse_from(["vtrelease", "build", "image", "lite"]);
    assert!(result.is_err());
}

#[test]
fn test_require_repo() {
    assert_eq!(
        require_repo(Some(Path::new("/src/vitess"))).unwrap(),
        PathBuf::from("/src/vitess")
    );
    assert!(matches!(require_repo(None), Err(ReleaseError::Config(_))));
    assert!(require_repo(Some(Path::new(""))).is_err());
}

#[test]
fn test_stage_options_mapping() {
    let args = StageArgs {
        branch: "release-12.0".to_string(),
        godoc_version: Some("0.12.2".to_string()),
    };
    let mut config = Config::default();
    config.stage.dev_marker = "dev".to_string();

    let options = stage_options(&args, Path::new("/src/vitess"), &config);

    assert_eq!(options.repo_path, PathBuf::from("/src/vitess"));
    assert_eq!(options.branch, "release-12.0");
    assert_eq!(options.godoc_version.as_deref(), Some("v0.12.2"));
    assert_eq!(options.dev_marker, "dev");
    assert!(options.validate().is_ok());
}

#[test]
fn test_build_options_overrides() {
    let args = ImageArgs {
        name: "lite".to_string(),
        version: "v12.0.4".to_string(),
        staging_registry: Some("registry.example.com/staging".to_string()),
        branch: Some("release-12.0".to_string()),
        distributions: vec!["bookworm".to_string()],
    };

    let options = build_options(&args, Path::new("/src/vitess"), &Config::default());

    assert_eq!(options.staging_registry, "registry.example.com/staging");
    assert_eq!(options.distributions, vec!["bookworm".to_string()]);
    assert_eq!(options.branch.as_deref(), Some("release-12.0"));
    assert!(options.validate().is_ok());
}

#[test]
fn test_build_options_default_to_config() {
    let args = ImageArgs {
        name: "lite".to_string(),
        version: "v12.0.4".to_string(),
        staging_registry: None,
        branch: None,
        distributions: vec![],
    };

    let options = build_options(&args, Path::new("/src/vitess"), &Config::default());

    assert_eq!(
        options.staging_registry,
        "gcr.io/puerco-chainguard/vitess/staging"
    );
    assert_eq!(
        options.distributions,
        vec!["buster".to_string(), "bullseye".to_string()]
    );
}
