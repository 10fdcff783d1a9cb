use assert_cmd::Command;
use predicates::prelude::*;
use sha1::{Digest, Sha1};
use std::fs;
use std::io::{Cursor, Write};
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/repository2-1.xml");

/// Helper to get the binary command, isolated from the user's config
fn sdkpack_cmd(config_root: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sdkpack"));
    cmd.env("SDKPACK_CONFIG_DIR", config_root.path().join(".sdkpack"))
        .env_remove("SDKPACK_MANIFEST_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A one-package repository2 manifest whose archive is served by `server`
fn platform_tools_manifest(payload: &[u8]) -> String {
    format!(
        r#"<sdk:sdk-repository xmlns:sdk="http://schemas.android.com/sdk/android/repo/repository2/01">
            <remotePackage path="platform-tools">
                <revision><major>35</major><minor>0</minor><micro>2</micro></revision>
                <display-name>Android SDK Platform-Tools</display-name>
                <archives><archive><complete><size>{}</size><checksum type="sha1">{}</checksum><url>platform-tools-linux.zip</url></complete><host-os>linux</host-os></archive></archives>
            </remotePackage>
        </sdk:sdk-repository>"#,
        payload.len(),
        hex::encode(Sha1::digest(payload))
    )
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    sdkpack_cmd(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("pack"));
}

#[test]
fn test_config_path_respects_env() {
    let temp_dir = TempDir::new().unwrap();
    sdkpack_cmd(&temp_dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".sdkpack"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_and_show() {
    let temp_dir = TempDir::new().unwrap();

    sdkpack_cmd(&temp_dir)
        .args(["config", "set", "packaging.version_suffix", "-r7"])
        .assert()
        .success();

    let saved = fs::read_to_string(temp_dir.path().join(".sdkpack/config.toml")).unwrap();
    assert!(saved.contains("version_suffix = \"-r7\""));

    sdkpack_cmd(&temp_dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-r7"))
        .stdout(predicate::str::contains("repository2-1.xml"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    sdkpack_cmd(&temp_dir)
        .args(["config", "set", "registry.url", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_list_fixture_json() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/repository2-1.xml")
        .with_status(200)
        .with_body(FIXTURE)
        .create();

    let output = sdkpack_cmd(&temp_dir)
        .args(["list", "--json", "--include-preview", "--include-obsolete", "--url"])
        .arg(format!("{}/repository2-1.xml", server.url()))
        .output()
        .unwrap();
    assert!(output.status.success());

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 76);
    assert_eq!(listed[0]["schema"], "v2");
    assert_eq!(listed[0]["kind"], "remote-package");
    assert_eq!(listed[75]["revision"], "36.0.0");
}

#[test]
fn test_list_section_with_revision_filter() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/repository2-1.xml")
        .with_status(200)
        .with_body(FIXTURE)
        .create();

    sdkpack_cmd(&temp_dir)
        .args(["list", "--revision", "30.0.3", "--revision", "26", "--url"])
        .arg(format!("{}/repository2-1.xml", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Android SDK Build-Tools 26.0.0"))
        .stdout(predicate::str::contains("Android SDK Build-Tools 30.0.3"))
        .stdout(predicate::str::contains("Total: 2 entries"));
}

#[test]
fn test_list_v1_table_shows_revision_once() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = r#"<sdk:sdk-repository xmlns:sdk="http://schemas.android.com/sdk/android/repository/11">
        <sdk:build-tool>
            <sdk:revision><sdk:major>25</sdk:major><sdk:minor>0</sdk:minor><sdk:micro>2</sdk:micro></sdk:revision>
            <sdk:archives><sdk:archive><sdk:size>2048</sdk:size><sdk:checksum type="sha1">ab</sdk:checksum><sdk:url>build-tools_r25.0.2-linux.zip</sdk:url><sdk:host-os>linux</sdk:host-os></sdk:archive></sdk:archives>
        </sdk:build-tool>
    </sdk:sdk-repository>"#;

    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/repository-11.xml")
        .with_status(200)
        .with_body(manifest)
        .create();

    let output = sdkpack_cmd(&temp_dir)
        .args(["list", "--url"])
        .arg(format!("{}/repository-11.xml", server.url()))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("build-tool "));
    assert_eq!(stdout.matches("25.0.2").count(), 1);
    assert!(stdout.contains("Total: 1 entry"));
}

#[test]
fn test_list_unreachable_manifest_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/missing.xml").with_status(404).create();

    sdkpack_cmd(&temp_dir)
        .args(["list", "--url"])
        .arg(format!("{}/missing.xml", server.url()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("404"));
}

#[test]
fn test_fetch_twice_downloads_once() {
    let temp_dir = TempDir::new().unwrap();
    let cache = temp_dir.path().join("cache");
    let payload = zip_bytes(&[("platform-tools/adb", b"adb")]);

    let mut server = mockito::Server::new();
    let _manifest = server
        .mock("GET", "/repository2-1.xml")
        .with_status(200)
        .with_body(platform_tools_manifest(&payload))
        .create();
    let download = server
        .mock("GET", "/platform-tools-linux.zip")
        .with_status(200)
        .with_body(payload.clone())
        .expect(1)
        .create();

    for _ in 0..2 {
        sdkpack_cmd(&temp_dir)
            .args(["fetch", "--section", "platform-tools", "--dir"])
            .arg(&cache)
            .arg("--url")
            .arg(format!("{}/repository2-1.xml", server.url()))
            .assert()
            .success()
            .stdout(predicate::str::contains("Fetched 1 entry"));
    }

    let adb = cache.join("Android SDK Platform-Tools-35.0.2/linux/platform-tools/adb");
    assert_eq!(fs::read(adb).unwrap(), b"adb");
    download.assert();
}

#[test]
fn test_fetch_checksum_mismatch_fails() {
    let temp_dir = TempDir::new().unwrap();
    let cache = temp_dir.path().join("cache");
    let payload = zip_bytes(&[("platform-tools/adb", b"adb")]);

    let mut server = mockito::Server::new();
    let _manifest = server
        .mock("GET", "/repository2-1.xml")
        .with_status(200)
        .with_body(platform_tools_manifest(&payload))
        .create();
    let _download = server
        .mock("GET", "/platform-tools-linux.zip")
        .with_status(200)
        .with_body(b"tampered".to_vec())
        .create();

    sdkpack_cmd(&temp_dir)
        .args(["fetch", "--section", "platform-tools", "--dir"])
        .arg(&cache)
        .arg("--url")
        .arg(format!("{}/repository2-1.xml", server.url()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Checksum mismatch"));

    assert!(!cache.join("Android SDK Platform-Tools-35.0.2/linux").exists());
}

#[test]
fn test_pack_writes_one_package_per_runtime() {
    let temp_dir = TempDir::new().unwrap();
    let cache = temp_dir.path().join("cache");
    let output = temp_dir.path().join("packages");
    let payload = zip_bytes(&[("platform-tools/adb", b"adb")]);

    let template = temp_dir.path().join("platform-tools.nuspec");
    fs::write(
        &template,
        r#"<package><metadata><id>Vendor.PlatformTools.{Runtime}</id><version>{Version}</version></metadata><files><file src="{Dir}/**/adb" target="runtimes/{Runtime}/native" /></files></package>"#,
    )
    .unwrap();

    let mut server = mockito::Server::new();
    let _manifest = server
        .mock("GET", "/repository2-1.xml")
        .with_status(200)
        .with_body(platform_tools_manifest(&payload))
        .create();
    let _download = server
        .mock("GET", "/platform-tools-linux.zip")
        .with_status(200)
        .with_body(payload.clone())
        .create();

    sdkpack_cmd(&temp_dir)
        .args(["pack", "--section", "platform-tools", "--version-suffix", "-beta"])
        .arg("--template")
        .arg(&template)
        .arg("--dir")
        .arg(&cache)
        .arg("--output")
        .arg(&output)
        .arg("--url")
        .arg(format!("{}/repository2-1.xml", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 packages"));

    for rid in ["win", "linux", "osx"] {
        assert!(output
            .join(format!("Vendor.PlatformTools.{}.35.0.2-beta.nupkg", rid))
            .exists());
    }
}

#[test]
fn test_pack_without_template_fails() {
    let temp_dir = TempDir::new().unwrap();
    sdkpack_cmd(&temp_dir)
        .args(["pack", "--url", "http://127.0.0.1:9/repository2-1.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .nuspec template given"));
}

#[test]
fn test_completions() {
    let temp_dir = TempDir::new().unwrap();
    sdkpack_cmd(&temp_dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sdkpack"));
}
