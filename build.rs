//! Build script do firmware.
//!
//! Só atua quando o alvo é o RP2350 (thumbv8m): copia o linker script para
//! OUT_DIR e o entrega ao linker do binário. No host (testes) não faz nada.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=link.x");
    println!("cargo:rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();
    if !target.starts_with("thumbv8m") {
        return;
    }

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR definido pelo cargo"));
    fs::copy("link.x", out.join("link.x")).expect("falha ao copiar link.x");
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
}
