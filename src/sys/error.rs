//! # Standard Error Codes (Errno)
//!
//! Códigos de erro devolvidos ao núcleo do emulador pela camada de disco.
//! Segue a numeração POSIX/Linux; o núcleo (C) espera `0` para sucesso e
//! valor negativo para falha, daí `as_status`.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    Success = 0,
    ENOENT = 2,     // No such file or directory
    EIO = 5,        // I/O error
    ENODEV = 19,    // No such device
    EINVAL = 22,    // Invalid argument
    ENOSPC = 28,    // No space left on device
    EROFS = 30,     // Read-only file system
    ERANGE = 34,    // Math result not representable
    ETIMEDOUT = 110, // Connection timed out
}

impl Errno {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Valor de retorno no contrato C do núcleo (`0` ou negativo).
    pub fn as_status(self) -> i32 {
        -(self as i32)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "sucesso",
            Self::ENOENT => "arquivo não encontrado",
            Self::EIO => "erro de I/O",
            Self::ENODEV => "dispositivo ausente",
            Self::EINVAL => "argumento inválido",
            Self::ENOSPC => "sem espaço",
            Self::EROFS => "somente leitura",
            Self::ERANGE => "fora do intervalo",
            Self::ETIMEDOUT => "timeout",
        }
    }
}

impl ::core::fmt::Display for Errno {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
