//! Build + package integration tests against a scratch project tree.
//!
//! Compiler and archiver runs are scripted: the fake `cargo`/`cross` writes
//! the binary where the real toolchain would, the fake `tar`/`zip` writes an
//! empty archive.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use moonwatch_core::process::testing::ScriptedRunner;
use moonwatch_core::{BundleMode, ConfigError, Invocation, PackageIdentity, ProjectLayout};
use moonwatch_pack::{pipeline, IdentityProvider, PackError, PipelineOptions, TargetScope};
use predicates::prelude::*;

const LINUX: &str = "x86_64-unknown-linux-gnu";
const WINDOWS: &str = "x86_64-pc-windows-gnu";

fn project() -> assert_fs::TempDir {
    let root = assert_fs::TempDir::new().expect("root");
    let share = root.child("share");
    share
        .child("default-config-unix.json")
        .write_str(r#"{"output_dir": "~/.moonwatch-rs/data"}"#)
        .expect("unix config");
    share
        .child("default-config-windows.json")
        .write_str(r#"{"output_dir": "C:\\moonwatch"}"#)
        .expect("windows config");
    share
        .child("install_unix.sh")
        .write_str("#!/bin/sh\n")
        .expect("installer");
    share
        .child("install_windows.bat")
        .write_str("@echo off\r\n")
        .expect("installer");
    share
        .child("moonwatch-rs.service")
        .write_str("[Unit]\nDescription=moonwatch\n")
        .expect("unit");
    root
}

/// Writes `target/<triple>/release/<binary>` under the invocation's cwd.
fn fake_toolchain(binary_for: fn(&str) -> &'static str) -> impl Fn(&Invocation) + 'static {
    move |inv: &Invocation| {
        let root = inv.cwd.clone().expect("toolchain cwd");
        let triple = inv
            .args
            .iter()
            .skip_while(|a| *a != "--target")
            .nth(1)
            .expect("--target value")
            .clone();
        let dir = root.join("target").join(&triple).join("release");
        fs::create_dir_all(&dir).expect("release dir");
        fs::write(dir.join(binary_for(&triple)), format!("ELF {triple}")).expect("binary");
    }
}

fn binary_name(triple: &str) -> &'static str {
    if triple.contains("windows") {
        "moonwatcher.exe"
    } else {
        "moonwatcher"
    }
}

/// Touches the archive named by the first argument after the flag.
fn fake_archiver(inv: &Invocation) {
    let cwd = inv.cwd.clone().expect("archiver cwd");
    fs::write(cwd.join(&inv.args[1]), b"archive").expect("archive");
}

fn scope(triples: &[&str]) -> TargetScope {
    TargetScope::Only(triples.iter().map(|t| t.to_string()).collect())
}

fn identity() -> PackageIdentity {
    PackageIdentity::new("moonwatch", "1.2.0")
}

fn read_tree(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .expect("read bundle")
        .filter_map(|e| e.ok())
        .map(|e| {
            (
                e.file_name().to_string_lossy().into_owned(),
                fs::read(e.path()).expect("read file"),
            )
        })
        .collect();
    entries.sort();
    entries
}

// ---------------------------------------------------------------------------
// 1. Plain bundles
// ---------------------------------------------------------------------------

#[test]
fn plain_linux_bundle_contains_full_file_set() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new().effect("cargo", fake_toolchain(binary_name));

    let results = pipeline::run(
        &layout,
        &scope(&[LINUX]),
        PipelineOptions::default(),
        &identity(),
        &runner,
    )
    .expect("pipeline");

    let bundle = root.child("build").child(LINUX);
    assert_eq!(results[0].output(), bundle.path());
    for name in ["moonwatcher", "config.json", "install_unix.sh", "moonwatch-rs.service"] {
        bundle.child(name).assert(predicate::path::is_file());
    }
    bundle
        .child("config.json")
        .assert(predicate::str::contains("moonwatch-rs/data"));
    assert_eq!(
        runner.command_lines(),
        vec![format!("cargo build --locked --release --target {LINUX}")]
    );
}

#[test]
fn plain_windows_bundle_omits_service_descriptor() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new().effect("cross", fake_toolchain(binary_name));

    pipeline::run(
        &layout,
        &scope(&[WINDOWS]),
        PipelineOptions::default(),
        &identity(),
        &runner,
    )
    .expect("pipeline");

    let bundle = root.child("build").child(WINDOWS);
    let names: Vec<String> = read_tree(bundle.path()).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["config.json", "install_windows.bat", "moonwatcher.exe"]);
    assert!(runner.command_lines()[0].starts_with("cross build"));
}

#[test]
fn repackaging_is_idempotent() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new().effect("cargo", fake_toolchain(binary_name));
    let run = || {
        pipeline::run(
            &layout,
            &scope(&[LINUX]),
            PipelineOptions::default(),
            &identity(),
            &runner,
        )
        .expect("pipeline")
    };

    let first = run();
    let before = read_tree(&first[0].bundle.dir);
    fs::write(first[0].bundle.dir.join("stray.log"), "leftover").expect("stray");

    let second = run();
    assert_eq!(first, second);
    assert_eq!(read_tree(&second[0].bundle.dir), before);
}

// ---------------------------------------------------------------------------
// 2. Archived bundles
// ---------------------------------------------------------------------------

#[test]
fn archived_linux_bundle_is_named_from_identity() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new()
        .effect("cargo", fake_toolchain(binary_name))
        .effect("tar", fake_archiver);
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };

    let results =
        pipeline::run(&layout, &scope(&[LINUX]), options, &identity(), &runner).expect("pipeline");

    let archive = root.path().join("build/moonwatch_1.2.0_Linux-x86-64.tar.gz");
    assert_eq!(results[0].archive.as_deref(), Some(archive.as_path()));
    assert_eq!(
        results[0].bundle.dir,
        root.path().join("build/moonwatch_1.2.0_Linux-x86-64")
    );

    let calls = runner.calls();
    let tar = calls.last().expect("tar call");
    assert_eq!(
        tar.to_string(),
        "tar -czf moonwatch_1.2.0_Linux-x86-64.tar.gz moonwatch_1.2.0_Linux-x86-64"
    );
    assert_eq!(tar.cwd.as_deref(), Some(root.path().join("build").as_path()));
}

#[test]
fn archived_windows_bundle_uses_zip() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new()
        .effect("cross", fake_toolchain(binary_name))
        .effect("zip", fake_archiver);
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };

    let results =
        pipeline::run(&layout, &scope(&[WINDOWS]), options, &identity(), &runner).expect("pipeline");

    assert_eq!(
        results[0].output(),
        root.path().join("build/moonwatch_1.2.0_Windows-x86-64.zip")
    );
}

#[test]
fn archived_rerun_clears_previous_staging_and_archive() {
    let root = project();
    let stale_dir = root.child("build/moonwatch_1.2.0_Linux-x86-64");
    stale_dir.child("old-binary").write_str("stale").expect("stale file");
    root.child("build/moonwatch_1.2.0_Linux-x86-64.tar.gz")
        .write_str("stale archive")
        .expect("stale archive");

    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new()
        .effect("cargo", fake_toolchain(binary_name))
        .effect("tar", fake_archiver);
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };
    pipeline::run(&layout, &scope(&[LINUX]), options, &identity(), &runner).expect("pipeline");

    stale_dir.child("old-binary").assert(predicate::path::missing());
    root.child("build/moonwatch_1.2.0_Linux-x86-64.tar.gz")
        .assert("archive");
}

#[test]
fn archiver_failure_is_fatal() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new()
        .effect("cargo", fake_toolchain(binary_name))
        .exit("tar", 2);
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };

    let err = pipeline::run(&layout, &scope(&[LINUX]), options, &identity(), &runner).unwrap_err();
    assert!(matches!(err, PackError::Archiver { .. }), "got: {err}");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn archiver_that_writes_nothing_is_reported() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new().effect("cargo", fake_toolchain(binary_name));
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };

    let err = pipeline::run(&layout, &scope(&[LINUX]), options, &identity(), &runner).unwrap_err();
    assert!(matches!(err, PackError::ArchiveMissing { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 3. Failure ordering
// ---------------------------------------------------------------------------

#[test]
fn toolchain_failure_leaves_no_output() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new().exit("cargo", 101);

    let err = pipeline::run(
        &layout,
        &scope(&[LINUX]),
        PipelineOptions::default(),
        &identity(),
        &runner,
    )
    .unwrap_err();

    assert!(matches!(err, PackError::Toolchain { .. }), "got: {err}");
    assert_eq!(err.exit_code(), 101);
    root.child("build").assert(predicate::path::missing());
    assert_eq!(runner.calls().len(), 1, "nothing runs after the failed build");
}

#[test]
fn missing_share_resource_fails_before_compiling() {
    let root = project();
    fs::remove_file(root.path().join("share/moonwatch-rs.service")).expect("remove unit");
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new();

    let err = pipeline::run(
        &layout,
        &scope(&[WINDOWS, LINUX]),
        PipelineOptions::default(),
        &identity(),
        &runner,
    )
    .unwrap_err();

    assert!(
        matches!(err, PackError::Config(ConfigError::MissingResource { .. })),
        "got: {err}"
    );
    assert!(runner.calls().is_empty());
}

#[test]
fn unknown_target_fails_before_compiling() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new();

    let err = pipeline::run(
        &layout,
        &scope(&[LINUX, "aarch64-apple-darwin"]),
        PipelineOptions::default(),
        &identity(),
        &runner,
    )
    .unwrap_err();

    assert!(
        matches!(err, PackError::Config(ConfigError::UnsupportedTarget { .. })),
        "got: {err}"
    );
    assert!(runner.calls().is_empty());
}

#[test]
fn skip_build_without_binary_is_missing_artifact() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new();
    let options = PipelineOptions {
        skip_build: true,
        ..PipelineOptions::default()
    };

    let err = pipeline::run(&layout, &scope(&[LINUX]), options, &identity(), &runner).unwrap_err();

    let expected: PathBuf = root
        .path()
        .join("target")
        .join(LINUX)
        .join("release")
        .join("moonwatcher");
    match err {
        PackError::MissingArtifact { path } => assert_eq!(path, expected),
        other => panic!("expected MissingArtifact, got: {other}"),
    }
    root.child("build").assert(predicate::path::missing());
}

#[test]
fn all_scope_packages_every_target_in_order() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new()
        .effect("cargo", fake_toolchain(binary_name))
        .effect("cross", fake_toolchain(binary_name));

    let results = pipeline::run(
        &layout,
        &TargetScope::All,
        PipelineOptions::default(),
        &identity(),
        &runner,
    )
    .expect("pipeline");

    let dirs: Vec<_> = results.iter().map(|r| r.bundle.dir.clone()).collect();
    assert_eq!(
        dirs,
        vec![
            root.path().join("build").join(LINUX),
            root.path().join("build").join(WINDOWS)
        ]
    );
}

/// Counts lookups; fails every one when `fail` is set.
struct CountingIdentity {
    lookups: Cell<usize>,
    fail: bool,
}

impl CountingIdentity {
    fn new(fail: bool) -> Self {
        Self {
            lookups: Cell::new(0),
            fail,
        }
    }
}

impl IdentityProvider for CountingIdentity {
    fn identity(&self) -> Result<PackageIdentity, PackError> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail {
            return Err(PackError::Identity("no manifest".into()));
        }
        Ok(identity())
    }
}

#[test]
fn archived_all_scope_resolves_identity_once() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new()
        .effect("cargo", fake_toolchain(binary_name))
        .effect("cross", fake_toolchain(binary_name))
        .effect("tar", fake_archiver)
        .effect("zip", fake_archiver);
    let provider = CountingIdentity::new(false);
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };

    let results =
        pipeline::run(&layout, &TargetScope::All, options, &provider, &runner).expect("pipeline");

    assert_eq!(results.len(), 2);
    assert_eq!(provider.lookups.get(), 1);
    root.child("build/moonwatch_1.2.0_Linux-x86-64.tar.gz")
        .assert(predicate::path::is_file());
    root.child("build/moonwatch_1.2.0_Windows-x86-64.zip")
        .assert(predicate::path::is_file());
}

#[test]
fn identity_failure_stops_before_compiling() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new();
    let provider = CountingIdentity::new(true);
    let options = PipelineOptions {
        mode: BundleMode::Archived,
        ..PipelineOptions::default()
    };

    let err = pipeline::run(&layout, &TargetScope::All, options, &provider, &runner).unwrap_err();

    assert!(matches!(err, PackError::Identity(_)), "got: {err}");
    assert!(runner.calls().is_empty(), "no toolchain or archiver runs");
    root.child("build").assert(predicate::path::missing());
}

#[test]
fn plain_mode_never_asks_for_identity() {
    let root = project();
    let layout = ProjectLayout::load(root.path()).expect("layout");
    let runner = ScriptedRunner::new().effect("cargo", fake_toolchain(binary_name));
    let provider = CountingIdentity::new(true);

    pipeline::run(
        &layout,
        &scope(&[LINUX]),
        PipelineOptions::default(),
        &provider,
        &runner,
    )
    .expect("pipeline");
    assert_eq!(provider.lookups.get(), 0);
}
