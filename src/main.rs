//! # PicoMac - Binário do Firmware
//!
//! O reset handler (`arch::rp2350::start`) prepara `.data`/`.bss` e salta
//! para `boot_main`, definido em `firmware`.
//!
//! No host o binário é vazio: toda a lógica vive na lib e é testada lá.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware;

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {}
