//! NuGet packaging of acquired containers
//!
//! A `.nuspec` template is rendered once per runtime (`win`, `linux`, `osx`)
//! with the container's version, the acquired directory and the runtime's
//! native library naming, then built into a `.nupkg`: a zip holding the
//! nuspec, the Open Packaging Conventions parts (`[Content_Types].xml`,
//! `_rels/.rels`) and the files the nuspec lists.
//!
//! # Template placeholders
//!
//! | Placeholder          | `win`                       | `linux`  | `osx`     |
//! |----------------------|-----------------------------|----------|-----------|
//! | `{Runtime}`          | `win`                       | `linux`  | `osx`     |
//! | `{OS}`               | `windows`                   | `linux`  | `macosx`  |
//! | `{LibPrefix}`        |                             | `lib`    | `lib`     |
//! | `{LibExtension}`     | `.dll`                      | `.so`    | `.dylib`  |
//! | `{Dependencies}`     | VC++ runtime `<dependency>`s|          |           |
//! | `{PlatformSpecific}` |                             |          |           |
//!
//! `{Version}` is the container's version plus the configured suffix and
//! `{Dir}` the directory the container was acquired into.

use crate::acquire::{acquire_container, ProgressCallback};
use crate::container::ArchiveContainer;
use crate::http::HttpClient;
use crate::xml::{parse_document, Element};
use crate::{Error, Result};
use quick_xml::escape::escape;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Dependencies every Windows package declares on the VC++ runtime
pub const VCRUNTIME_DEPENDENCIES: &str = r#"<dependency id="runtime.win7-x64.vcruntime140" version="14.0.24406-r158" /><dependency id="runtime.win7-x86.vcruntime140" version="14.0.24406-r158" />"#;

/// A target platform packages are generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runtime {
    /// Runtime identifier, as used in NuGet `runtimes/{rid}` folders
    pub rid: &'static str,
    /// Host OS name as the SDK manifests spell it
    pub os: &'static str,
    pub lib_prefix: &'static str,
    pub lib_extension: &'static str,
    pub dependencies: &'static str,
}

pub const RUNTIMES: [Runtime; 3] = [
    Runtime {
        rid: "win",
        os: "windows",
        lib_prefix: "",
        lib_extension: ".dll",
        dependencies: VCRUNTIME_DEPENDENCIES,
    },
    Runtime {
        rid: "linux",
        os: "linux",
        lib_prefix: "lib",
        lib_extension: ".so",
        dependencies: "",
    },
    Runtime {
        rid: "osx",
        os: "macosx",
        lib_prefix: "lib",
        lib_extension: ".dylib",
        dependencies: "",
    },
];

/// Substitute the template placeholders for one runtime
pub fn render_nuspec(template: &str, version: &str, dir: &Path, runtime: &Runtime) -> String {
    template
        .replace("{Version}", version)
        .replace("{PlatformSpecific}", "")
        .replace("{Dependencies}", runtime.dependencies)
        .replace("{LibPrefix}", runtime.lib_prefix)
        .replace("{LibExtension}", runtime.lib_extension)
        .replace("{Dir}", &dir.display().to_string())
        .replace("{Runtime}", runtime.rid)
        .replace("{OS}", runtime.os)
}

/// A `<file>` entry of a nuspec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuspecFile {
    pub src: String,
    pub target: Option<String>,
}

/// The parts of a nuspec needed to build a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nuspec {
    pub id: String,
    pub version: String,
    pub files: Vec<NuspecFile>,
}

impl Nuspec {
    /// Read `metadata/id`, `metadata/version` and `files/file` from nuspec XML
    pub fn parse(xml: &str) -> Result<Self> {
        let root = parse_document(xml)?;
        if root.name() != "package" {
            return Err(Error::schema(format!(
                "expected <package> nuspec root, found <{}>",
                root.name()
            )));
        }

        let metadata = root.required_child("metadata")?;
        let id = required_text(metadata, "id")?;
        let version = required_text(metadata, "version")?;

        let files = match root.own_child("files") {
            Some(files) => files
                .children_named(files.namespace(), "file")
                .map(|file| {
                    let src = file
                        .attribute("src")
                        .filter(|src| !src.trim().is_empty())
                        .ok_or_else(|| Error::schema("<file> is missing its src attribute"))?;
                    Ok(NuspecFile {
                        src: src.trim().to_string(),
                        target: file
                            .attribute("target")
                            .map(str::trim)
                            .filter(|target| !target.is_empty())
                            .map(str::to_string),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self { id, version, files })
    }

    /// File name of the package built from this nuspec
    pub fn package_file_name(&self) -> String {
        format!("{}.{}.nupkg", self.id, self.version)
    }
}

fn required_text(element: &Element, name: &str) -> Result<String> {
    let text = element.required_child(name)?.text();
    if text.is_empty() {
        return Err(Error::schema(format!("<{}> must not be empty", name)));
    }
    Ok(text.to_string())
}

/// Build a `.nupkg` from a rendered nuspec file, returning the package path
///
/// `src` paths in the nuspec are resolved against the nuspec's directory and
/// may name a file, a directory (packed recursively) or a glob pattern.
pub fn build_package(nuspec_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let contents = fs::read_to_string(nuspec_path)?;
    let nuspec = Nuspec::parse(&contents)?;
    let base_dir = nuspec_path.parent().unwrap_or_else(|| Path::new("."));

    let mut entries: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in &nuspec.files {
        for (target, source) in resolve_files(base_dir, file)? {
            if let Some(existing) = entries.get(&target) {
                warn!(
                    target = %target,
                    kept = %existing.display(),
                    skipped = %source.display(),
                    "duplicate package entry"
                );
                continue;
            }
            entries.insert(target, source);
        }
    }

    fs::create_dir_all(output_dir)?;
    let package_path = output_dir.join(nuspec.package_file_name());
    debug!(
        package = %package_path.display(),
        files = entries.len(),
        "writing package"
    );

    let mut zip = ZipWriter::new(File::create(&package_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let nuspec_name = format!("{}.nuspec", nuspec.id);
    zip.start_file(nuspec_name.as_str(), options)?;
    zip.write_all(contents.as_bytes())?;

    for (target, source) in &entries {
        zip.start_file(target.as_str(), file_options(source, options)?)?;
        io::copy(&mut File::open(source)?, &mut zip)?;
    }

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(relationships(&nuspec, &nuspec_name).as_bytes())?;

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(entries.keys()).as_bytes())?;

    zip.finish()?;

    info!(package = %package_path.display(), "package written");
    Ok(package_path)
}

#[cfg(unix)]
fn file_options(source: &Path, options: SimpleFileOptions) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(source)?.permissions().mode();
    Ok(options.unix_permissions(mode & 0o777))
}

#[cfg(not(unix))]
fn file_options(_source: &Path, options: SimpleFileOptions) -> Result<SimpleFileOptions> {
    Ok(options)
}

/// Expand one `<file>` entry into `(package path, source file)` pairs
fn resolve_files(base_dir: &Path, file: &NuspecFile) -> Result<Vec<(String, PathBuf)>> {
    let src = base_dir.join(&file.src);
    let target = file.target.as_deref().unwrap_or("");

    if is_glob(&file.src) {
        let pattern = src.to_string_lossy().to_string();
        let pattern_base = glob_base(&src);
        let mut resolved = Vec::new();

        for entry in glob::glob(&pattern)
            .map_err(|e| Error::Other(format!("Invalid file pattern '{}': {}", file.src, e)))?
        {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&pattern_base).unwrap_or(&path);
            resolved.push((package_path(target, relative)?, path.clone()));
        }

        if resolved.is_empty() {
            warn!(pattern = %file.src, "file pattern matched nothing");
        }
        return Ok(resolved);
    }

    if src.is_dir() {
        let mut resolved = Vec::new();
        for entry in walkdir::WalkDir::new(&src).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Other(format!("Failed to read {}: {}", src.display(), e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&src).unwrap_or(entry.path());
            resolved.push((package_path(target, relative)?, entry.path().to_path_buf()));
        }
        return Ok(resolved);
    }

    if src.is_file() {
        let file_name = src
            .file_name()
            .map(Path::new)
            .ok_or_else(|| Error::Other(format!("Invalid file source '{}'", file.src)))?;

        // A target carrying the source's extension renames the file.
        let renames = !target.is_empty()
            && Path::new(target).extension().is_some()
            && Path::new(target).extension() == file_name.extension();

        let path = if renames {
            package_path("", Path::new(target))?
        } else {
            package_path(target, file_name)?
        };
        return Ok(vec![(path, src)]);
    }

    Err(Error::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("nuspec file source not found: {}", src.display()),
    )))
}

fn is_glob(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

/// Leading components of a glob pattern that contain no wildcards
fn glob_base(pattern: &Path) -> PathBuf {
    pattern
        .components()
        .take_while(|c| !is_glob(&c.as_os_str().to_string_lossy()))
        .collect()
}

/// Join a nuspec target folder and a relative path into a zip entry name
fn package_path(target: &str, relative: &Path) -> Result<String> {
    let mut parts: Vec<String> = target
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .map(str::to_string)
        .collect();

    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            _ => {
                return Err(Error::Other(format!(
                    "package path escapes the package root: {}",
                    relative.display()
                )))
            }
        }
    }

    if parts.iter().any(|part| part == "..") || parts.is_empty() {
        return Err(Error::Other(format!(
            "invalid package path '{}' for target '{}'",
            relative.display(),
            target
        )));
    }

    Ok(parts.join("/"))
}

fn relationships(nuspec: &Nuspec, nuspec_name: &str) -> String {
    let digest = Sha256::digest(format!("{}/{}", nuspec.id, nuspec.version).as_bytes());
    let id = hex::encode(&digest[..8]).to_uppercase();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Type="http://schemas.microsoft.com/packaging/2010/07/manifest" Target="/{}" Id="R{}" /></Relationships>"#,
        escape(nuspec_name),
        id
    )
}

fn content_types<'a>(entries: impl Iterator<Item = &'a String>) -> String {
    let mut extensions: BTreeSet<String> = BTreeSet::new();
    extensions.insert("rels".to_string());
    extensions.insert("nuspec".to_string());
    let mut overrides = Vec::new();

    for entry in entries {
        match Path::new(entry).extension() {
            Some(ext) => {
                extensions.insert(ext.to_string_lossy().to_lowercase());
            }
            None => overrides.push(entry.as_str()),
        }
    }

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    for extension in &extensions {
        let content_type = if extension == "rels" {
            "application/vnd.openxmlformats-package.relationships+xml"
        } else {
            "application/octet"
        };
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}" />"#,
            escape(extension.as_str()),
            content_type
        ));
    }
    for part in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="/{}" ContentType="application/octet" />"#,
            escape(part)
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// Settings for [`generate_packages`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageOptions {
    /// Delete and re-acquire containers that are already present
    pub overwrite: bool,
    /// Appended to every package version, e.g. `-beta1`
    pub version_suffix: String,
    /// Where `.nupkg` files go; defaults to the target directory
    pub output_dir: Option<PathBuf>,
}

/// Acquire each container and build one package per runtime
///
/// For every container, `{dir}-{rid}.nuspec` is written next to the
/// acquired directory and built into a package. Returns the package paths
/// in the order they were written.
pub fn generate_packages<C: ArchiveContainer>(
    client: &HttpClient,
    containers: &[C],
    template: &str,
    target_dir: &Path,
    options: &PackageOptions,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target_dir)?;
    let output_dir = options.output_dir.as_deref().unwrap_or(target_dir);
    let mut packages = Vec::new();

    for container in containers {
        info!(
            name = container.name(),
            revision = %container.display_revision(),
            "generating packages"
        );

        let dir = acquire_container(client, container, target_dir, options.overwrite, progress)?;
        let version = format!("{}{}", container.revision().to_version(), options.version_suffix);

        for runtime in &RUNTIMES {
            let nuspec_path = target_dir.join(format!("{}-{}.nuspec", container.directory_name(), runtime.rid));
            fs::write(&nuspec_path, render_nuspec(template, &version, &dir, runtime))?;
            packages.push(build_package(&nuspec_path, output_dir)?);
        }
    }

    Ok(packages)
}
