//! Adaptador do núcleo umac (C).
//!
//! O núcleo chama de volta `umac_audio_trap`/`umac_audio_cfg` de dentro de
//! `umac_loop`; os callbacks só acumulam bits em `PENDING`, que `tick`
//! devolve como `CoreRequests`.

use ::core::ffi::c_void;
use ::core::slice;
use ::core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use picomac::core::config;
use picomac::core::emulator::{AudioConfig, CoreRequests, EmulationCore};
use picomac::drivers::audio::{REGION_FROM_END, SAMPLES_PER_BUFFER};
use picomac::drivers::disc::{DiscDescriptor, DiscIo};
use picomac::sys::Errno;

pub const DISC_NUM_DRIVES: usize = 2;

type DiscOp = unsafe extern "C" fn(ctx: *mut c_void, data: *mut u8, offset: u32, len: u32) -> i32;

/// `disc_descr_t` do umac.
#[repr(C)]
pub struct DiscDescr {
    /// Imagem em memória; nulo => usar `op_read`/`op_write`.
    base: *const u8,
    read_only: i32,
    size: u32,
    op_ctx: *mut c_void,
    op_read: Option<DiscOp>,
    op_write: Option<DiscOp>,
}

impl DiscDescr {
    pub const EMPTY: Self = Self {
        base: ::core::ptr::null(),
        read_only: 0,
        size: 0,
        op_ctx: ::core::ptr::null_mut(),
        op_read: None,
        op_write: None,
    };
}

extern "C" {
    fn umac_init(ram_base: *mut c_void, rom_base: *const c_void, discs: *mut DiscDescr) -> i32;
    fn umac_loop() -> i32;
    fn umac_vsync_event();
    fn umac_1hz_event();
    fn umac_mouse(dx: i32, dy: i32, buttons: i32);
    fn umac_kbd_event(code: u8, release: i32);
    fn umac_get_fb_offset() -> u32;
}

// =============================================================================
// CALLBACKS DO NÚCLEO
// =============================================================================

static PENDING: AtomicU8 = AtomicU8::new(0);
static VOLUME: AtomicU32 = AtomicU32::new(0);
static SOUND_DISABLED: AtomicBool = AtomicBool::new(true);

#[no_mangle]
pub extern "C" fn umac_audio_trap() {
    PENDING.fetch_or(CoreRequests::AUDIO_TRAP.bits(), Ordering::AcqRel);
}

#[no_mangle]
pub extern "C" fn umac_audio_cfg(volume: i32, sndres: i32) {
    VOLUME.store(volume.max(0) as u32, Ordering::Relaxed);
    SOUND_DISABLED.store(sndres != 0, Ordering::Relaxed);
    PENDING.fetch_or(CoreRequests::AUDIO_CONFIG.bits(), Ordering::AcqRel);
}

// =============================================================================
// DISCO
// =============================================================================

/// Liga um `DiscDescriptor` Rust ao `disc_descr_t` do núcleo.
///
/// Imagem embutida => ponteiro direto. Arquivo => `read`/`write`, que voltam
/// ao descritor Rust.
pub fn describe<F: DiscIo>(
    disc: &DiscDescriptor<F>,
    read: DiscOp,
    write: DiscOp,
) -> DiscDescr {
    match disc {
        DiscDescriptor::Image(data) => DiscDescr {
            base: data.as_ptr(),
            read_only: 1,
            size: data.len() as u32,
            ..DiscDescr::EMPTY
        },
        DiscDescriptor::Backed { size, read_only, .. } => DiscDescr {
            read_only: *read_only as i32,
            size: *size as u32,
            op_read: Some(read),
            op_write: Some(write),
            ..DiscDescr::EMPTY
        },
    }
}

/// Leitura pedida pelo núcleo, em formato de status C.
///
/// # Safety
/// `data` aponta para `len` bytes graváveis.
pub unsafe fn disc_read_into<F: DiscIo>(
    disc: &mut DiscDescriptor<F>,
    data: *mut u8,
    offset: u32,
    len: u32,
) -> i32 {
    if data.is_null() {
        return Errno::EINVAL.as_status();
    }
    let buf = slice::from_raw_parts_mut(data, len as usize);
    match disc.read(offset as u64, buf) {
        Ok(()) => 0,
        Err(e) => e.as_status(),
    }
}

/// # Safety
/// `data` aponta para `len` bytes legíveis.
pub unsafe fn disc_write_from<F: DiscIo>(
    disc: &mut DiscDescriptor<F>,
    data: *const u8,
    offset: u32,
    len: u32,
) -> i32 {
    if data.is_null() {
        return Errno::EINVAL.as_status();
    }
    let buf = slice::from_raw_parts(data, len as usize);
    match disc.write(offset as u64, buf) {
        Ok(()) => 0,
        Err(e) => e.as_status(),
    }
}

// =============================================================================
// NÚCLEO
// =============================================================================

pub struct UmacCore {
    ram: *mut u8,
    ram_size: usize,
    fb_offset: usize,
}

impl UmacCore {
    /// Inicializa o núcleo sobre `ram`, de `ram_size` bytes.
    ///
    /// # Safety
    /// `ram` é exclusiva do núcleo e vive para sempre; `discs` também.
    pub unsafe fn init(
        ram: *mut u8,
        ram_size: usize,
        rom: &'static [u8],
        discs: &'static mut [DiscDescr; DISC_NUM_DRIVES],
    ) -> Self {
        umac_init(ram.cast(), rom.as_ptr().cast(), discs.as_mut_ptr());
        let fb_offset = umac_get_fb_offset() as usize;
        picomac::kinfo!("(umac) RAM, bytes: "; ram_size);
        picomac::kinfo!("(umac) Framebuffer no offset ", fb_offset);
        Self {
            ram,
            ram_size,
            fb_offset,
        }
    }

    /// Início do framebuffer dentro da RAM emulada.
    pub fn framebuffer_ptr(&self) -> *const u32 {
        // SAFETY: offset devolvido pelo próprio núcleo, dentro de ram_size.
        unsafe { self.ram.add(self.fb_offset) as *const u32 }
    }
}

impl EmulationCore for UmacCore {
    fn tick(&mut self) -> CoreRequests {
        // SAFETY: núcleo inicializado em `init`; só o core 1 chama.
        unsafe { umac_loop() };
        CoreRequests::from_bits_truncate(PENDING.swap(0, Ordering::AcqRel))
    }

    fn vsync(&mut self) {
        unsafe { umac_vsync_event() }
    }

    fn one_second(&mut self) {
        unsafe { umac_1hz_event() }
    }

    fn mouse(&mut self, dx: i32, dy: i32, buttons: u8) {
        unsafe { umac_mouse(dx, dy, buttons as i32) }
    }

    fn key(&mut self, code: u8, release: bool) {
        unsafe { umac_kbd_event(code, release as i32) }
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            volume: VOLUME.load(Ordering::Relaxed),
            sound_disabled: SOUND_DISABLED.load(Ordering::Relaxed),
        }
    }

    fn framebuffer(&self) -> &[u32] {
        // SAFETY: o framebuffer do Mac cabe na RAM emulada.
        unsafe { slice::from_raw_parts(self.framebuffer_ptr(), config::GEOMETRY.words()) }
    }

    fn audio_region(&self) -> &[u16] {
        // SAFETY: REGION_FROM_END bytes (>= 2 * SAMPLES_PER_BUFFER) no fim da RAM.
        unsafe {
            let base = self.ram.add(self.ram_size - REGION_FROM_END) as *const u16;
            slice::from_raw_parts(base, SAMPLES_PER_BUFFER)
        }
    }
}
