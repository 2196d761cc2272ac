//! System Definitions.
//!
//! Códigos de erro compartilhados entre o firmware e os colaboradores
//! externos (núcleo do emulador, camada de armazenamento).

pub mod error;

pub use error::Errno;
