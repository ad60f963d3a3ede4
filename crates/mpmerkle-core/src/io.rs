//! Serialization helpers for plans, configs and leaf files.
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON
//! for writes.
//!
//! Extras:
//! - In-memory CBOR helpers: [`to_cbor`] / [`from_cbor`]
//! - Tiny versioned payload wrapper: [`Versioned<T>`]

use crate::{Plan, TreeConfig};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Wire version written alongside exported plans.
pub const PLAN_WIRE_VERSION: u16 = 1;

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

/// ------------------------------
/// Generic JSON/CBOR I/O
/// ------------------------------

/// Read any `T` from **JSON**.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P, what: &str) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: T = serde_json::from_reader(rdr).with_context(|| format!("deserialize JSON {what}"))?;
    Ok(v)
}

/// Write any `T` to **JSON** (pretty).
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T, what: &str) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| format!("serialize JSON {what}"))?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/// Read any `T` from **CBOR**.
pub fn read_cbor<T: DeserializeOwned, P: AsRef<Path>>(path: P, what: &str) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    let v: T =
        ciborium::de::from_reader(&mut rdr).with_context(|| format!("deserialize CBOR {what}"))?;
    Ok(v)
}

/// Write any `T` to **CBOR**.
pub fn write_cbor<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T, what: &str) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| format!("serialize CBOR {what}"))?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_auto<T: DeserializeOwned, P: AsRef<Path>>(path: P, what: &str) -> Result<T> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_json(path, what),
        Some("cbor") => read_cbor(path, what),
        Some(other) => Err(anyhow!(
            "unsupported {} extension: {} (supported: .json, .cbor)",
            what,
            other
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_auto<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T, what: &str) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_cbor(path, v, what),
        _ => write_json(path, v, what),
    }
}

/// ------------------------------
/// Plan / config / leaves
/// ------------------------------

/// Read a versioned [`Plan`] by extension, rejecting unknown wire versions.
pub fn read_plan_auto<P: AsRef<Path>>(path: P) -> Result<Plan> {
    let wrapped: Versioned<Plan> = read_auto(path, "plan")?;
    if wrapped.ver != PLAN_WIRE_VERSION {
        return Err(anyhow!(
            "plan wire version mismatch: expected {}, got {}",
            PLAN_WIRE_VERSION,
            wrapped.ver
        ));
    }
    Ok(wrapped.payload)
}

/// Write a [`Plan`] wrapped in [`Versioned`] (JSON unless the path ends in `.cbor`).
pub fn write_plan_auto<P: AsRef<Path>>(path: P, plan: &Plan) -> Result<()> {
    write_auto(path, &Versioned::new(PLAN_WIRE_VERSION, plan), "plan")
}

/// Read a [`TreeConfig`] by extension.
pub fn read_config_auto<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<TreeConfig<T>> {
    read_auto(path, "config")
}

/// Write a [`TreeConfig`] by extension.
pub fn write_config_auto<T: Serialize, P: AsRef<Path>>(path: P, cfg: &TreeConfig<T>) -> Result<()> {
    write_auto(path, cfg, "config")
}

/// Read a flat list of `u64` leaf values by extension.
pub fn read_leaves_auto<P: AsRef<Path>>(path: P) -> Result<Vec<u64>> {
    read_auto(path, "leaves")
}

/// Write a flat list of `u64` leaf values by extension.
pub fn write_leaves_auto<P: AsRef<Path>>(path: P, leaves: &[u64]) -> Result<()> {
    write_auto(path, leaves, "leaves")
}

/// ------------------------------
/// In-memory CBOR helpers
/// ------------------------------

/// Serialize any `T: Serialize` to **CBOR bytes** using `ciborium`.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).with_context(|| "serialize CBOR (to_cbor)")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from **CBOR bytes** using `ciborium`.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let v = ciborium::de::from_reader(&mut cur).with_context(|| "deserialize CBOR (from_cbor)")?;
    Ok(v)
}

/// ------------------------------
/// Tiny versioned wrapper
/// ------------------------------

/// Small versioned wrapper to tag payloads.
///
/// Pairs a `u16` tag with a payload; callers enforce wire versions at the
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Wire version tag.
    pub ver: u16,
    /// Wrapped payload.
    pub payload: T,
}

impl<T> Versioned<T> {
    /// Construct a new versioned wrapper.
    #[inline]
    pub const fn new(ver: u16, payload: T) -> Self {
        Self { ver, payload }
    }
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Human-friendly path display for error messages.
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkDesc, LayerPlan};

    fn tmp_path(name: &str, ext: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("mpmerkle_core_io_{}_{}.{}", name, nanos, ext));
        p
    }

    fn small_plan() -> Plan {
        Plan::from_parts(
            4,
            2,
            vec![LayerPlan {
                index: 0,
                input_size: 4,
                chunks: vec![ChunkDesc::new(0, 2, 0), ChunkDesc::new(2, 2, 1)],
            }],
            LayerPlan {
                index: 1,
                input_size: 2,
                chunks: vec![ChunkDesc::new(0, 2, 2)],
            },
        )
    }

    #[test]
    fn plan_cbor_file_roundtrip() {
        let path = tmp_path("plan", "cbor");
        let plan = small_plan();
        write_plan_auto(&path, &plan).unwrap();
        let got = read_plan_auto(&path).unwrap();
        assert_eq!(got, plan);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn plan_with_foreign_version_is_rejected() {
        let path = tmp_path("plan_v9", "json");
        write_auto(&path, &Versioned::new(9, small_plan()), "plan").unwrap();
        let err = read_plan_auto(&path).unwrap_err();
        assert!(err.to_string().contains("version mismatch"), "{err}");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_extension_is_rejected_on_read() {
        let err = read_leaves_auto("leaves.txt").unwrap_err();
        assert!(err.to_string().contains("unsupported leaves extension"));
    }

    #[test]
    fn config_without_expected_root_reads_for_any_root_type() {
        // No `Default` impl: reading must not require one.
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Hex(String);

        let path = tmp_path("config", "json");
        std::fs::write(&path, r#"{"leaf_count":20,"per_unit_capacity":16}"#).unwrap();
        let cfg: TreeConfig<Hex> = read_config_auto(&path).unwrap();
        assert_eq!(cfg, TreeConfig::new(20, 16));

        let path_cbor = tmp_path("config", "cbor");
        let with_root = TreeConfig::new(20, 16).with_expected_root(Hex("ab".into()));
        write_config_auto(&path_cbor, &with_root).unwrap();
        assert_eq!(read_config_auto::<Hex, _>(&path_cbor).unwrap(), with_root);
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path_cbor);
    }

    #[test]
    fn leaves_json_roundtrip() {
        let path = tmp_path("leaves", "json");
        write_leaves_auto(&path, &[1, 2, 3, 4]).unwrap();
        assert_eq!(read_leaves_auto(&path).unwrap(), vec![1, 2, 3, 4]);
        let _ = std::fs::remove_file(path);
    }
}
