// =============================================================================
// FIRMWARE LOGGING - ZERO OVERHEAD
// =============================================================================
//
// Logs do firmware pela UART0, com custo ZERO quando desligados.
//
// ARQUITETURA:
// - Filtragem em tempo de compilação pelas features `no_logs`/`log_*`.
// - SEM core::fmt: apenas strings e números (hex ou decimal).
// - SEM alocação e SEM lock: os dois cores podem escrever ao mesmo tempo.
// - Antes de `serial::init` (durante o sequenciamento de clocks) a saída é
//   descartada silenciosamente.
//
// NÍVEIS (do mais crítico ao menos):
// - ERROR: falhas fatais (clock não trava, codec não responde)
// - WARN:  situações recuperáveis (PSRAM ausente, timeout de registrador)
// - INFO:  marcos do boot (frequências, tamanho da RAM, disco escolhido)
// - DEBUG: valores de registradores calculados
// - TRACE: cada iteração dos loops (muito ruidoso)
//
// USO:
//   kinfo!("(CLK) Iniciando sequenciamento");   // Apenas string
//   kinfo!("(QMI) TIMING=", timing);            // String + hex
//   kinfo!("(CLK) clk_sys Hz: "; hz);           // String + decimal
//   klog!("A=", a, " B=", b);                   // Sem prefixo, sem newline
//
// =============================================================================

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";
pub const P_OK: &str = "\x1b[32m[OK]\x1b[0m ";
pub const P_FAIL: &str = "\x1b[1;31m[FAIL]\x1b[0m ";

// =============================================================================
// LINHA COM PREFIXO (uso interno dos macros de nível)
// =============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __klog_line {
    ($prefix:expr, $msg:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_nl();
    }};
    ($prefix:expr, $msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
        $crate::drivers::serial::emit_nl();
    }};
    ($prefix:expr, $msg:expr; $val:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_dec($val as usize);
        $crate::drivers::serial::emit_nl();
    }};
}

// =============================================================================
// ERROR / WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)+) => {
        $crate::__klog_line!($crate::core::logging::P_ERROR, $($t)+)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)+) => {
        $crate::__klog_line!($crate::core::logging::P_WARN, $($t)+)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// INFO
// =============================================================================
//
// Desligado com `log_error` ou `no_logs`.
//

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)+) => {
        $crate::__klog_line!($crate::core::logging::P_INFO, $($t)+)
    };
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// DEBUG / TRACE
// =============================================================================

#[cfg(all(not(feature = "no_logs"), any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)+) => {
        $crate::__klog_line!($crate::core::logging::P_DEBUG, $($t)+)
    };
}

#[cfg(not(all(not(feature = "no_logs"), any(feature = "log_debug", feature = "log_trace"))))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)+) => {
        $crate::__klog_line!($crate::core::logging::P_TRACE, $($t)+)
    };
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// klog! - Log sem prefixo e sem newline, para montar linhas compostas.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    ($msg:expr) => {{
        $crate::drivers::serial::emit_str($msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
    }};
    ($msg:expr; $val:expr) => {{
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_dec($val as usize);
    }};
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::drivers::serial::emit_str($msg1);
        $crate::drivers::serial::emit_hex($val1 as u64);
        $crate::drivers::serial::emit_str($msg2);
        $crate::drivers::serial::emit_hex($val2 as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

/// knl! - Emite apenas newline.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::drivers::serial::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}

// =============================================================================
// STATUS (OK/FAIL)
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {
        $crate::__klog_line!($crate::core::logging::P_OK, $msg)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {
        $crate::__klog_line!($crate::core::logging::P_FAIL, $msg)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}
