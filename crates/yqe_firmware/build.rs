/// Passes the firmware link script to the linker when building for RISC-V.
use std::env;
use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let script = manifest_dir.join("link.ld");

    if env::var("CARGO_CFG_TARGET_ARCH").is_ok_and(|arch| arch.starts_with("riscv")) {
        println!("cargo:rustc-link-arg-bins=-T{}", script.display());
    }

    println!("cargo:rerun-if-changed=link.ld");
    println!("cargo:rerun-if-changed=src/entry.S");
    println!("cargo:rerun-if-env-changed=YQE_PROGRAM");
    println!("cargo:rerun-if-env-changed=YQE_LOG");
}
