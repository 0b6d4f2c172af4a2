use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Number, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::settings as keys;
use crate::error::{RotateError, RotateResult};
use crate::types::{Alignment, Opacity, ProfileTarget, Stretch};

/// The four fields written into the addressed profile
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub image: PathBuf,
    pub alignment: Alignment,
    pub stretch: Stretch,
    pub opacity: Opacity,
}

/// Read the settings file, patch the target profile and write it back whole.
///
/// Nothing is written when the target profile cannot be located.
pub fn publish(path: &Path, target: ProfileTarget, background: &Background) -> RotateResult<()> {
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => RotateError::SettingsNotFound {
            probed: vec![path.to_path_buf()],
        },
        _ => RotateError::ReadFailure {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut document: Value = serde_json::from_str(&contents).map_err(|e| malformed(path, e.to_string()))?;
    patch_document(&mut document, target, background).map_err(|e| match e {
        PatchError::Malformed(reason) => malformed(path, reason),
        PatchError::OutOfRange { index, len } => RotateError::ProfileIndexOutOfRange { index, len },
    })?;

    let mut out = to_pretty_json(&document).map_err(|e| RotateError::WriteFailure {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })?;
    out.push(b'\n');
    fs::write(path, out).map_err(|source| RotateError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), profile = %target, "Wrote terminal settings");
    Ok(())
}

/// Failure to find the target inside an already parsed document
#[derive(Debug, PartialEq)]
pub enum PatchError {
    Malformed(String),
    OutOfRange { index: usize, len: usize },
}

fn malformed(path: &Path, reason: String) -> RotateError {
    RotateError::MalformedSettingsDocument {
        path: path.to_path_buf(),
        reason,
    }
}

/// Overwrite the background fields of `target` inside `document`.
///
/// `profiles.defaults` is created when missing; a numbered profile must exist.
pub fn patch_document(
    document: &mut Value,
    target: ProfileTarget,
    background: &Background,
) -> Result<(), PatchError> {
    let profiles = document
        .get_mut(keys::PROFILES)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| PatchError::Malformed(format!("missing \"{}\" object", keys::PROFILES)))?;

    let profile = match target.list_index() {
        None => profiles
            .entry(keys::DEFAULTS)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| PatchError::Malformed("profiles.defaults is not an object".to_string()))?,
        Some(index) => {
            let list = profiles
                .get_mut(keys::LIST)
                .and_then(Value::as_array_mut)
                .ok_or_else(|| PatchError::Malformed("missing profiles.list array".to_string()))?;
            let len = list.len();
            list.get_mut(index)
                .ok_or(PatchError::OutOfRange { index: index + 1, len })?
                .as_object_mut()
                .ok_or_else(|| PatchError::Malformed(format!("profiles.list[{index}] is not an object")))?
        }
    };

    // Map::insert keeps the position of keys that already exist
    profile.insert(
        keys::BACKGROUND_IMAGE.to_string(),
        Value::String(background.image.to_string_lossy().into_owned()),
    );
    profile.insert(
        keys::BACKGROUND_IMAGE_ALIGNMENT.to_string(),
        Value::String(background.alignment.as_str().to_string()),
    );
    profile.insert(
        keys::BACKGROUND_IMAGE_STRETCH_MODE.to_string(),
        Value::String(background.stretch.as_str().to_string()),
    );
    profile.insert(
        keys::BACKGROUND_IMAGE_OPACITY.to_string(),
        Value::Number(normalized_number(background.opacity.get())),
    );
    Ok(())
}

/// Round to a fixed number of decimals, drop trailing zeros, prefer integers.
///
/// Keeps the written value free of float noise such as `0.35000000000000003`.
pub fn normalized_number(value: f64) -> Number {
    let value = if value == 0.0 { 0.0 } else { value };
    let text = format!("{:.*}", keys::OPACITY_DECIMALS, value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');

    if let Ok(int) = trimmed.parse::<u64>() {
        return Number::from(int);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .unwrap_or_else(|| Number::from(0u64))
}

fn to_pretty_json(document: &Value) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(keys::INDENT);
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    Ok(buf)
}
