//! Scan-out DVI (HSTX + DMA, lado C). Roda no core 1 para que as IRQs de
//! DMA não disputem com o USB do core 0.

use picomac::drivers::video::ScanOut;

extern "C" {
    fn video_init(framebuffer: *const u32);
}

pub struct DviScanOut;

impl ScanOut for DviScanOut {
    fn start(&mut self, base: *const u32) {
        picomac::kinfo!("(Video) Scan-out a partir de ", base as usize);
        unsafe { video_init(base) }
    }
}
