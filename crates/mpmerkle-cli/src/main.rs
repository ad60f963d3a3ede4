// crates/mpmerkle-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mpmerkle_core::{
    io::{read_config_auto, read_leaves_auto, write_leaves_auto, write_plan_auto},
    TreeConfig, DEFAULT_CAPACITY, DEFAULT_LEAVES,
};
use mpmerkle_merkle::{
    commit_leaves_file, verify_leaves_file_against_manifest, CombinerKind,
};
use mpmerkle_scheduler::plan;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "mpmerkle",
    about = "Multi-prover Merkle reference CLI",
    long_about = "Multi-prover Merkle reference CLI.\n\nUse this tool to plan capacity-bounded reduction layers, compute roots, and commit/verify leaf files.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// Tree shape flags shared by several subcommands.
#[derive(clap::Args, Debug, Clone)]
struct ShapeArgs {
    /// Total number of leaves N [default: 1024]
    #[arg(long)]
    leaves: Option<usize>,

    /// Maximum values one prover reduces directly, C [default: 16]
    #[arg(long)]
    prover_capacity: Option<usize>,

    /// Config file (JSON/CBOR) with leaf_count, per_unit_capacity, expected_root.
    /// Explicit flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Plan the reduction layers and print a parameter summary
    Plan {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Output path for the plan (CBOR/JSON)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print every layer and chunk range
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Compute the root of a leaf file (or N synthetic all-ones leaves)
    Root {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Combiner used for every merge
        #[arg(long, value_enum, default_value_t = CombinerOpt::Sum)]
        combiner: CombinerOpt,

        /// Input leaves (CBOR/JSON array of u64); defaults to all ones
        #[arg(long)]
        input: Option<PathBuf>,

        /// Expected root: decimal for `sum`, hex for `blake3`
        #[arg(long)]
        expected: Option<String>,

        /// Print the result as one JSON object
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write a synthetic leaves file
    Leaves {
        /// Number of leaves
        #[arg(long, default_value_t = DEFAULT_LEAVES)]
        leaves: usize,

        /// Leaf value pattern
        #[arg(long, value_enum, default_value_t = PatternOpt::Ones)]
        pattern: PatternOpt,

        /// Output path (CBOR/JSON)
        #[arg(long, default_value = "leaves.json")]
        out: PathBuf,
    },

    /// Commit a leaves file to a root and write a manifest
    Commit {
        /// Input leaves (CBOR/JSON)
        #[arg(long)]
        input: PathBuf,

        /// Maximum values one prover reduces directly, C
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        prover_capacity: usize,

        /// Combiner used for every merge
        #[arg(long, value_enum, default_value_t = CombinerOpt::Blake3)]
        combiner: CombinerOpt,

        /// Output path for the manifest (CBOR/JSON)
        #[arg(long, default_value = "manifest.json")]
        out: PathBuf,
    },

    /// Check that a leaves file matches a manifest
    VerifyCommit {
        /// Input leaves (CBOR/JSON)
        #[arg(long)]
        input: PathBuf,

        /// Input path to manifest (CBOR/JSON)
        #[arg(long)]
        manifest: PathBuf,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum CombinerOpt {
    /// Wrapping u64 addition (mock)
    Sum,
    /// BLAKE3 Merkle parents over hashed leaves
    Blake3,
}

impl From<CombinerOpt> for CombinerKind {
    fn from(c: CombinerOpt) -> Self {
        match c {
            CombinerOpt::Sum => Self::Sum,
            CombinerOpt::Blake3 => Self::Blake3,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum PatternOpt {
    /// Every leaf is 1
    Ones,
    /// Leaf i is i
    Index,
}

#[derive(Serialize)]
struct RootReport<'a> {
    combiner: CombinerKind,
    leaf_count: usize,
    capacity: usize,
    root: String,
    matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<&'a str>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Plan {
            shape,
            out,
            verbose,
        } => plan_cmd(&shape, out, verbose),

        Cmd::Root {
            shape,
            combiner,
            input,
            expected,
            json,
        } => root_cmd(&shape, combiner.into(), input, expected, json),

        Cmd::Leaves {
            leaves,
            pattern,
            out,
        } => write_leaves(leaves, pattern, out),

        Cmd::Commit {
            input,
            prover_capacity,
            combiner,
            out,
        } => commit(input, prover_capacity, combiner.into(), out),

        Cmd::VerifyCommit { input, manifest } => verify_commit(input, manifest),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Merge a config file (if any) with explicit flags; flags win.
fn resolve_shape(shape: &ShapeArgs) -> Result<TreeConfig<String>> {
    let mut cfg: TreeConfig<String> = match &shape.config {
        Some(path) => read_config_auto(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => TreeConfig::default(),
    };
    if let Some(n) = shape.leaves {
        cfg.leaf_count = n;
    }
    if let Some(c) = shape.prover_capacity {
        cfg.per_unit_capacity = c;
    }
    Ok(cfg)
}

fn plan_cmd(shape: &ShapeArgs, out: Option<PathBuf>, verbose: bool) -> Result<()> {
    let cfg = resolve_shape(shape)?;
    info!(leaves = cfg.leaf_count, capacity = cfg.per_unit_capacity, "planning");
    let p = plan(cfg.leaf_count, cfg.per_unit_capacity).context("planning layers")?;

    println!("Total leaves: {}", p.leaf_count());
    println!("Leaves per prover: {}", p.capacity());
    println!("Total provers: {}", p.total_units());
    println!("Total layers: {}", p.layer_count());
    println!("Last layer size: {}", p.terminal().input_size);
    if verbose {
        println!("{p}");
    }

    if let Some(out) = out {
        ensure_parent_dir(&out)?;
        write_plan_auto(&out, &p).with_context(|| format!("writing plan to {}", out.display()))?;
        println!("Wrote plan → {}", out.display());
    }
    Ok(())
}

fn root_cmd(
    shape: &ShapeArgs,
    kind: CombinerKind,
    input: Option<PathBuf>,
    expected: Option<String>,
    json: bool,
) -> Result<()> {
    let cfg = resolve_shape(shape)?;

    let leaves = match &input {
        Some(path) => {
            let v = read_leaves_auto(path)
                .with_context(|| format!("reading leaves {}", path.display()))?;
            // A leaf count from --leaves or --config must agree with the file.
            let pinned = shape.leaves.is_some() || shape.config.is_some();
            if pinned && cfg.leaf_count != v.len() {
                bail!(
                    "leaf count mismatch: expected {}, got {} leaves in {}",
                    cfg.leaf_count,
                    v.len(),
                    path.display()
                );
            }
            v
        }
        None => vec![1u64; cfg.leaf_count],
    };

    let expected = expected.or(cfg.expected_root);
    let expected_bytes = expected
        .as_deref()
        .map(|s| kind.parse_root(s))
        .transpose()
        .context("parsing expected root")?;

    info!(%kind, leaves = leaves.len(), capacity = cfg.per_unit_capacity, "computing root");
    let out = kind
        .evaluate(&leaves, cfg.per_unit_capacity, expected_bytes.as_deref())
        .context("computing root")?;
    let root = kind.format_root(&out.root);

    if json {
        let report = RootReport {
            combiner: kind,
            leaf_count: leaves.len(),
            capacity: cfg.per_unit_capacity,
            root: root.clone(),
            matched: out.matched,
            expected: expected.as_deref(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize root report")?
        );
    } else {
        println!("Root ({kind}): {root}");
        if out.is_match() {
            println!("OK: root matches expected");
        }
    }

    if out.matched == Some(false) {
        bail!(
            "root mismatch: expected {}, computed {root}",
            expected.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

fn write_leaves(n: usize, pattern: PatternOpt, out: PathBuf) -> Result<()> {
    if n == 0 {
        bail!("--leaves must be at least 1");
    }
    let leaves: Vec<u64> = match pattern {
        PatternOpt::Ones => vec![1; n],
        PatternOpt::Index => (0..n as u64).collect(),
    };
    ensure_parent_dir(&out)?;
    write_leaves_auto(&out, &leaves)
        .with_context(|| format!("writing leaves to {}", out.display()))?;
    println!("Wrote {n} leaves ({pattern:?}) → {}", out.display());
    Ok(())
}

fn commit(input: PathBuf, capacity: usize, kind: CombinerKind, out: PathBuf) -> Result<()> {
    info!(input=%input.display(), out=%out.display(), %kind, capacity, "committing leaves");
    ensure_parent_dir(&out)?;

    let man = commit_leaves_file(kind, &input, capacity, &out).with_context(|| {
        format!(
            "committing {} to manifest {}",
            input.display(),
            out.display()
        )
    })?;

    println!(
        "Committed {} leaves ({kind}, C={}) → {} [root {}]",
        man.leaf_count,
        man.capacity,
        out.display(),
        man.root
    );
    Ok(())
}

fn verify_commit(input: PathBuf, manifest: PathBuf) -> Result<()> {
    info!(input=%input.display(), manifest=%manifest.display(), "verifying commit");
    verify_leaves_file_against_manifest(&input, &manifest).with_context(|| {
        format!(
            "verifying that {} matches manifest {}",
            input.display(),
            manifest.display()
        )
    })?;

    println!(
        "OK: {} matches manifest {}",
        input.display(),
        manifest.display()
    );
    Ok(())
}
