//! Cópia do framebuffer do emulador para o espelho 640x480.

use super::{Geometry, OUTPUT};

pub const MIRROR_WORDS: usize = OUTPUT.words();

/// Publica um quadro.
///
/// - 640x480: cópia direta.
/// - Menor: centralizado, cada palavra invertida (no Mac 1 = preto).
///
/// `src` tem `geometry.words()` palavras; `dst` tem `MIRROR_WORDS`.
pub fn publish(geometry: Geometry, src: &[u32], dst: &mut [u32]) {
    if geometry == OUTPUT {
        dst[..MIRROR_WORDS].copy_from_slice(&src[..MIRROR_WORDS]);
        return;
    }

    let in_row = geometry.words_per_row();
    let out_row = OUTPUT.words_per_row();
    let x_off = (out_row - in_row) / 2;
    let y_off = ((OUTPUT.height - geometry.height) / 2) as usize;

    for (i, row) in src.chunks_exact(in_row).take(geometry.height as usize).enumerate() {
        let start = (y_off + i) * out_row + x_off;
        for (d, s) in dst[start..start + in_row].iter_mut().zip(row) {
            *d = !*s;
        }
    }
}
