//! Rendering generated artifacts and writing them to disk.

use crate::error::{Error, Result, ToolingError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// License of every generated file.
pub const LICENSE: &str = "Apache-2.0 WITH LLVM-exception";

/// Edition passed to the formatter.
pub const EDITION: &str = "2021";

/// One generated file before it is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// File name relative to the output directory.
    pub filename: String,
    /// Paths brought into scope with `use`, e.g. `super::enums::*`.
    pub imports: Vec<String>,
    pub body: String,
}

/// Where the generated code came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provenance {
    /// File name of the grammar document.
    pub source: String,
    pub version: Option<String>,
}

impl Provenance {
    pub fn new(grammar: &Path, version: Option<String>) -> Self {
        let source = grammar
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| grammar.display().to_string());
        Provenance { source, version }
    }
}

/// The full text of `artifact`: license line, provenance, the do-not-edit
/// marker, `use` lines and the body.
pub fn render(artifact: &Artifact, provenance: &Provenance) -> String {
    let version = match &provenance.version {
        Some(v) => format!("version {v}"),
        None => "unversioned".to_string(),
    };
    let mut out = format!(
        "// SPDX-License-Identifier: {LICENSE}\n\
         // Generated by spirvgen from {} ({version}).\n\
         // Do not edit manually.\n\n",
        provenance.source
    );
    for import in &artifact.imports {
        out.push_str(&format!("use {import};\n"));
    }
    if !artifact.imports.is_empty() {
        out.push('\n');
    }
    out.push_str(&artifact.body);
    out
}

/// An external source formatter, run on every written file.
#[derive(Clone, Debug)]
pub struct Rustfmt {
    exe: PathBuf,
}

impl Rustfmt {
    /// Resolve `name` on `PATH` (or as a path) to an executable.
    pub fn locate(name: &str) -> Result<Self, ToolingError> {
        let exe = which::which(name).map_err(|source| ToolingError::FormatterNotFound {
            name: name.to_string(),
            source,
        })?;
        log::debug!("using formatter '{}'", exe.display());
        Ok(Rustfmt { exe })
    }

    /// Format `path` in place.
    pub fn format(&self, path: &Path) -> Result<(), ToolingError> {
        let status = Command::new(&self.exe)
            .arg(format!("--edition={EDITION}"))
            .arg(path)
            .status()
            .map_err(|source| ToolingError::FormatterSpawn {
                formatter: self.exe.clone(),
                path: path.to_path_buf(),
                source,
            })?;
        if !status.success() {
            return Err(ToolingError::FormatterFailed {
                formatter: self.exe.clone(),
                path: path.to_path_buf(),
                status,
            });
        }
        Ok(())
    }
}

/// What [`write`] did.
#[derive(Debug, Default)]
pub struct Report {
    /// Every file written, in artifact order.
    pub written: Vec<PathBuf>,
    /// Formatter failures; the affected files are left unformatted.
    pub warnings: Vec<ToolingError>,
}

/// Write every artifact into `out_dir`, creating it if needed, then run the
/// formatter over the written files.
pub fn write(
    out_dir: &Path,
    artifacts: &[Artifact],
    provenance: &Provenance,
    formatter: Option<&Rustfmt>,
) -> Result<Report> {
    fs::create_dir_all(out_dir).map_err(|source| Error::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut report = Report::default();
    for artifact in artifacts {
        let path = out_dir.join(&artifact.filename);
        fs::write(&path, render(artifact, provenance)).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("wrote '{}'", path.display());
        report.written.push(path);
    }

    if let Some(formatter) = formatter {
        for path in &report.written {
            if let Err(e) = formatter.format(path) {
                log::warn!("{e}; leaving the file unformatted");
                report.warnings.push(e);
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact {
            filename: "names.rs".into(),
            imports: vec!["super::enums::*".into()],
            body: "pub fn f() {}\n".into(),
        }
    }

    fn provenance() -> Provenance {
        Provenance::new(
            Path::new("/some/where/spirv.core.grammar.json"),
            Some("1.6 rev. 4".into()),
        )
    }

    #[test]
    fn render_envelope() {
        assert_eq!(
            render(&artifact(), &provenance()),
            "// SPDX-License-Identifier: Apache-2.0 WITH LLVM-exception\n\
             // Generated by spirvgen from spirv.core.grammar.json (version 1.6 rev. 4).\n\
             // Do not edit manually.\n\
             \n\
             use super::enums::*;\n\
             \n\
             pub fn f() {}\n"
        );
    }

    #[test]
    fn render_without_imports_or_version() {
        let mut a = artifact();
        a.imports.clear();
        let p = Provenance {
            source: "g.json".into(),
            version: None,
        };
        let text = render(&a, &p);
        assert!(text.contains("from g.json (unversioned)"), "{text}");
        assert!(text.ends_with("manually.\n\npub fn f() {}\n"), "{text}");
    }

    #[test]
    fn render_is_deterministic() {
        assert_eq!(
            render(&artifact(), &provenance()),
            render(&artifact(), &provenance())
        );
    }

    #[test]
    fn write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("gen");
        let report = write(&out, &[artifact()], &provenance(), None).unwrap();
        assert_eq!(report.written, [out.join("names.rs")]);
        assert!(report.warnings.is_empty());
        let text = fs::read_to_string(out.join("names.rs")).unwrap();
        assert!(text.starts_with("// SPDX-License-Identifier"));
    }

    #[test]
    fn missing_formatter() {
        let err = Rustfmt::locate("spirvgen-no-such-formatter").unwrap_err();
        assert!(matches!(err, ToolingError::FormatterNotFound { .. }));
        assert!(err.to_string().contains("spirvgen-no-such-formatter"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_formatter_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let fmt = Rustfmt::locate("false").unwrap();
        let report = write(dir.path(), &[artifact()], &provenance(), Some(&fmt)).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            report.warnings[0],
            ToolingError::FormatterFailed { .. }
        ));
        let text = fs::read_to_string(dir.path().join("names.rs")).unwrap();
        assert!(text.ends_with("pub fn f() {}\n"));
    }
}
