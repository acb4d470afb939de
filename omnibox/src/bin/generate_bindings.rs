//! Generate UniFFI Swift bindings for the omnibox core
//!
//! Run: cargo run --bin generate-bindings
//!
//! Writes the C header, module map and universal `libomnibox.a` to
//! `Sources/OmniboxRust/`, and the Swift bindings to `Sources/OmniboxRustWrapper/`.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const FFI_MODULE: &str = "OmniboxRustFFI";

fn main() -> Result<()> {
    let rust_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let project_root = rust_dir.parent().context("No parent directory")?;

    // Ensure Rust is built with the same deployment target as the Swift app
    env::set_var("MACOSX_DEPLOYMENT_TARGET", "15.0");

    println!("Building Rust library...");
    run_cmd("cargo", &["build", "--release"], &rust_dir)?;

    println!("Generating Swift bindings...");
    run_cmd(
        "cargo",
        &[
            "run",
            "--bin",
            "uniffi-bindgen",
            "generate",
            "--library",
            "target/release/libomnibox.dylib",
            "--language",
            "swift",
            "--out-dir",
            "generated",
        ],
        &rust_dir,
    )?;

    let swift_dest = project_root.join("Sources/OmniboxRust");
    let wrapper_dest = project_root.join("Sources/OmniboxRustWrapper");
    let generated = rust_dir.join("generated");
    fs::create_dir_all(&swift_dest).context("Create FFI dir")?;
    fs::create_dir_all(&wrapper_dest).context("Create wrapper dir")?;

    // Swift 6 concurrency + module import
    println!("Copying generated Swift file...");
    let swift_content = fs::read_to_string(generated.join("omnibox.swift"))
        .context("Read swift file")?
        .replace(
            "private var initializationResult",
            "nonisolated(unsafe) private var initializationResult",
        )
        .replace("#if canImport(omniboxFFI)", &format!("#if canImport({FFI_MODULE})"))
        .replace("import omniboxFFI", &format!("import {FFI_MODULE}"));
    fs::write(wrapper_dest.join("omnibox.swift"), swift_content).context("Write swift")?;

    fs::copy(generated.join("omniboxFFI.h"), swift_dest.join("omniboxFFI.h")).context("Copy header")?;

    println!("Writing modulemap...");
    fs::write(
        swift_dest.join("module.modulemap"),
        format!("module {FFI_MODULE} {{\n    header \"omniboxFFI.h\"\n    export *\n}}\n"),
    )
    .context("Write modulemap")?;

    println!("Building universal static library...");
    for target in ["aarch64-apple-darwin", "x86_64-apple-darwin"] {
        run_cmd("cargo", &["build", "--release", "--target", target], &rust_dir)?;
    }
    run_cmd(
        "lipo",
        &[
            "-create",
            "target/aarch64-apple-darwin/release/libomnibox.a",
            "target/x86_64-apple-darwin/release/libomnibox.a",
            "-output",
            &swift_dest.join("libomnibox.a").to_string_lossy(),
        ],
        &rust_dir,
    )?;

    println!("Done! Bindings regenerated successfully.");
    println!("  - {}/omnibox.swift (UniFFI generated)", wrapper_dest.display());
    println!("  - {}/omniboxFFI.h", swift_dest.display());
    println!("  - {}/module.modulemap", swift_dest.display());
    println!("  - {}/libomnibox.a", swift_dest.display());
    Ok(())
}

fn run_cmd(program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    if !status.success() {
        bail!("{} failed with status: {}", program, status);
    }
    Ok(())
}
