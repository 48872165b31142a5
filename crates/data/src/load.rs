use anyhow::Context;
use gambit_core::content::{ContentBundle, MajorDef};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Wire shape of `majors.json`.
#[derive(Debug, Clone, Deserialize)]
struct MajorsFile {
    content_version: String,
    majors: Vec<MajorDef>,
}

/// Parse and validate a bundle from raw JSON documents.
pub fn bundle_from_json(majors_raw: &str, strings_raw: &str) -> anyhow::Result<ContentBundle> {
    let majors: MajorsFile =
        serde_json::from_str(majors_raw).context("parse majors bundle")?;
    let strings: BTreeMap<String, String> =
        serde_json::from_str(strings_raw).context("parse strings bundle")?;
    let bundle = ContentBundle {
        content_version: majors.content_version,
        majors: majors.majors,
        strings,
    };
    bundle.validate()?;
    tracing::debug!(
        content_version = %bundle.content_version,
        majors = bundle.majors.len(),
        strings = bundle.strings.len(),
        "content bundle validated"
    );
    Ok(bundle)
}

/// Load `majors.json` and `strings.json` from a content directory.
pub fn load_dir(dir: &Path) -> anyhow::Result<ContentBundle> {
    let majors_path = dir.join("majors.json");
    let majors_raw = fs::read_to_string(&majors_path)
        .with_context(|| format!("read {}", majors_path.display()))?;
    let strings_path = dir.join("strings.json");
    let strings_raw = fs::read_to_string(&strings_path)
        .with_context(|| format!("read {}", strings_path.display()))?;
    bundle_from_json(&majors_raw, &strings_raw)
        .with_context(|| format!("load content from {}", dir.display()))
}

pub const BUILTIN_MAJORS: &str = include_str!("../assets/majors.json");
pub const BUILTIN_STRINGS: &str = include_str!("../assets/strings.json");

/// The pack shipped with the engine: 21 authored Majors plus their strings.
pub fn load_builtin() -> anyhow::Result<ContentBundle> {
    bundle_from_json(BUILTIN_MAJORS, BUILTIN_STRINGS).context("load builtin content pack")
}

/// FNV-1a 64 over the canonical bytes of a bundle. Saves and logs carry it so
/// mismatched content is caught before a replay silently diverges.
pub fn content_signature(bundle: &ContentBundle) -> String {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let canonical = serde_json::to_string(bundle).unwrap_or_default();
    let mut hash = OFFSET;
    for byte in canonical.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    format!("{hash:016x}")
}
