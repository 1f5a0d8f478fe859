//! Versioned JSON persistence for fitted artifacts.
//!
//! Each artifact is written as an envelope `{kind, format_version,
//! created_at, payload}`. Loading checks the kind and the version before the
//! payload is decoded.
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Current on-disk format version for every artifact kind.
pub const FORMAT_VERSION: u32 = 1;

/// A value that can be persisted as a training artifact.
pub trait Artifact: Serialize + DeserializeOwned {
    const KIND: &'static str;
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    kind: &'a str,
    format_version: u32,
    created_at: String,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    kind: String,
    format_version: u32,
    #[serde(default)]
    created_at: Option<String>,
    payload: serde_json::Value,
}

/// Serialize `value` into `path`, creating parent directories as needed.
pub fn save_artifact<T: Artifact, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    log::info!("Saving {} to {}", T::KIND, path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let envelope = EnvelopeRef {
        kind: T::KIND,
        format_version: FORMAT_VERSION,
        created_at: chrono::Local::now().to_rfc3339(),
        payload: value,
    };
    let json = serde_json::to_string_pretty(&envelope)
        .with_context(|| format!("Failed to serialize {}", T::KIND))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("{} successfully saved to {}", T::KIND, path.display());
    Ok(())
}

/// Read an artifact back, rejecting a different kind or format version.
pub fn load_artifact<T: Artifact, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    log::info!("Loading {} from {}", T::KIND, path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact: {}", path.display()))?;
    let envelope: Envelope = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse artifact envelope: {}", path.display()))?;

    if envelope.kind != T::KIND {
        bail!(
            "Artifact {} holds a '{}', expected '{}'",
            path.display(),
            envelope.kind,
            T::KIND
        );
    }
    if envelope.format_version != FORMAT_VERSION {
        bail!(
            "Artifact {} has format version {}, this build reads version {}",
            path.display(),
            envelope.format_version,
            FORMAT_VERSION
        );
    }
    log::debug!(
        "{} created at {}",
        T::KIND,
        envelope.created_at.as_deref().unwrap_or("unknown time")
    );

    serde_json::from_value(envelope.payload)
        .with_context(|| format!("Failed to decode {} payload", T::KIND))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dummy {
        values: Vec<f64>,
    }

    impl Artifact for Dummy {
        const KIND: &'static str = "dummy";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Other;

    impl Artifact for Other {
        const KIND: &'static str = "other";
    }

    #[test]
    fn saved_artifact_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts/dummy.json");
        let value = Dummy { values: vec![1.5, -2.0] };

        save_artifact(&path, &value).unwrap();
        let loaded: Dummy = load_artifact(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dummy.json");
        save_artifact(&path, &Dummy { values: vec![] }).unwrap();

        let err = load_artifact::<Other, _>(&path).unwrap_err();
        assert!(err.to_string().contains("expected 'other'"));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dummy.json");
        fs::write(
            &path,
            r#"{"kind":"dummy","format_version":99,"payload":{"values":[]}}"#,
        )
        .unwrap();

        let err = load_artifact::<Dummy, _>(&path).unwrap_err();
        assert!(err.to_string().contains("format version 99"));
    }
}
