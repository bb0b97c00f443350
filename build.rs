//! Build script for echostats.
//!
//! Copies `.env.example` into the local data directory, next to the `.env`
//! file that `config::load_env` reads, so a fresh install has a template to
//! start from.
//!
//! # Directory Structure
//!
//! The template is copied to:
//! - Linux: `~/.local/share/echostats/.env.example`
//! - macOS: `~/Library/Application Support/echostats/.env.example`
//! - Windows: `%LOCALAPPDATA%/echostats/.env.example`
//!
//! A missing template or an unwritable directory only emits a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("echostats");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    // read-only build environments should not fail the build
    if let Err(e) = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&template, out_dir.join(".env.example")).map(|_| ()))
    {
        println!(
            "cargo:warning=cannot copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
