//! Key Generation CLI for the Shroud note circuit
//!
//! Generates the Groth16 proving and verifying keys for [`NoteCircuit`].
//!
//! Usage:
//!   cargo run --package shroud-prover --bin keygen -- --pk-out ./keys/proving.key --vk-out ./keys/verifying.key
//!
//! Keys must be regenerated whenever the circuit changes.
//!
//! [`NoteCircuit`]: shroud_prover::NoteCircuit

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ark_std::rand::{SeedableRng, rngs::StdRng};
use clap::Parser;
use rand::rngs::OsRng;
use shroud_config::ShroudConfig;
use shroud_prover::keys::{encode_proving_key, encode_verifying_key};
use shroud_prover::{NUM_PUBLIC_INPUTS, setup, verifying_key_hash};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PK_PATH: &str = "./proving.key";
const DEFAULT_VK_PATH: &str = "./verifying.key";

#[derive(Parser, Debug)]
#[command(name = "keygen", about = "Generate Groth16 keys for the Shroud note circuit")]
struct Args {
    /// Path for proving key output [default: configured path or ./proving.key]
    #[arg(long)]
    pk_out: Option<PathBuf>,

    /// Path for verifying key output [default: configured path or ./verifying.key]
    #[arg(long)]
    vk_out: Option<PathBuf>,

    /// Seed the setup RNG (reproducible, development keys only)
    #[arg(long)]
    seed: Option<u64>,

    /// Overwrite existing keys
    #[arg(short, long)]
    force: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ShroudConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pk_path = args
        .pk_out
        .or_else(|| config.prover.proving_key_path.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PK_PATH));
    let vk_path = args
        .vk_out
        .or_else(|| config.prover.verifying_key_path.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_VK_PATH));

    let existing = existing_keys(&pk_path, &vk_path);
    if !args.force && !existing.is_empty() {
        println!("Keys already exist at:");
        for path in existing {
            println!("  {}", path.display());
        }
        println!("\nUse --force to regenerate keys.");
        return Ok(());
    }

    info!(public_inputs = NUM_PUBLIC_INPUTS, "Running note circuit setup");

    let (pk, vk) = match args.seed {
        Some(seed) => {
            warn!(seed, "Seeded setup: keys are reproducible and must not be used in production");
            setup(&mut StdRng::seed_from_u64(seed))?
        }
        None => setup(&mut OsRng)?,
    };

    let pk_bytes = encode_proving_key(&pk)?;
    write_key(&pk_path, &pk_bytes).context("Failed to write proving key")?;
    info!(
        path = %pk_path.display(),
        size_mb = %format!("{:.2}", pk_bytes.len() as f64 / 1024.0 / 1024.0),
        "Saved proving key"
    );

    let vk_bytes = encode_verifying_key(&vk)?;
    write_key(&vk_path, &vk_bytes).context("Failed to write verifying key")?;
    info!(path = %vk_path.display(), size = vk_bytes.len(), "Saved verifying key");

    println!();
    println!("Verification key hash (blake3):");
    println!("  {}", hex::encode(verifying_key_hash(&vk_bytes)));
    println!();
    println!("To use these keys, set:");
    println!("  export SHROUD_PROVING_KEY={}", pk_path.display());
    println!("  export SHROUD_VERIFYING_KEY={}", vk_path.display());

    Ok(())
}

/// Key files that would be overwritten
fn existing_keys<'a>(pk_path: &'a Path, vk_path: &'a Path) -> Vec<&'a Path> {
    [pk_path, vk_path]
        .into_iter()
        .filter(|p| p.exists())
        .collect()
}

fn write_key(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_either_existing_key_blocks_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let pk = dir.path().join("proving.key");
        let vk = dir.path().join("verifying.key");
        assert!(existing_keys(&pk, &vk).is_empty());

        fs::write(&vk, b"vk").unwrap();
        assert_eq!(existing_keys(&pk, &vk), vec![vk.as_path()]);

        fs::write(&pk, b"pk").unwrap();
        assert_eq!(existing_keys(&pk, &vk).len(), 2);
    }

    #[test]
    fn test_write_key_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("verifying.key");
        write_key(&path, b"bytes").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"bytes");
    }
}
