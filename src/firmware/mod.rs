// =============================================================================
// FIRMWARE - COLA DA PLACA (Fruit Jam / RP2350)
// =============================================================================
//
// Core 0 (`boot_main`):
//   bring-up -> [self-test] -> codec + I2S -> lança core 1 -> USB host (loop A)
//
// Core 1 (`core1_entry`):
//   disco -> umac_init -> scan-out -> loop de eventos (loop B)
//
// HAND-OFF ENTRE CORES:
// - `BOOT`  (Once):  relatório do bring-up, publicado antes do lançamento.
// - `CODEC` (Mutex): o codec é inicializado no core 0 e movido para o
//   produtor de áudio do core 1.
// - `DISC`  (Once<Mutex>): descritor do disco, alcançado pelos callbacks C
//   do núcleo.
//
// =============================================================================

mod audio;
mod sd;
mod umac;
mod usb;
mod video;

use ::core::ffi::c_void;
use ::core::ptr::{addr_of, addr_of_mut};
use ::core::slice;

use picomac::arch::rp2350::multicore::launch_core1;
use picomac::core::config;
use picomac::core::entry::{bring_up, BootReport};
use picomac::core::fatal;
use picomac::core::scheduler::{AudioStage, EventLoop, IoLoop, MirrorStage};
use picomac::drivers::audio::AudioBufferProducer;
use picomac::drivers::disc::{select_disc, ActivityLed, DiscDescriptor, LedIo};
use picomac::drivers::gpio;
use picomac::drivers::input::INPUT;
use picomac::drivers::timer::SystemTimer;
use picomac::drivers::video::{ScanOut, MIRROR_WORDS};
use picomac::hal::MmioBus;
use picomac::sys::Errno;
use spin::{Mutex, Once};

use audio::Codec;
use umac::{DiscDescr, UmacCore, DISC_NUM_DRIVES};

type Disc = DiscDescriptor<LedIo<sd::SdFile, BoardLed>>;

static BOOT: Once<BootReport> = Once::new();
static CODEC: Mutex<Option<Codec>> = Mutex::new(None);
static DISC: Once<Mutex<Disc>> = Once::new();

static mut DISCS: [DiscDescr; DISC_NUM_DRIVES] = [DiscDescr::EMPTY, DiscDescr::EMPTY];
static mut MIRROR: [u32; MIRROR_WORDS] = [0; MIRROR_WORDS];

static mut SRAM_RAM: [u8; config::FALLBACK_RAM_SIZE] = [0; config::FALLBACK_RAM_SIZE];

// Imagens embutidas pelo objcopy
extern "C" {
    static _binary_umac_rom_bin_start: u8;
    static _binary_umac_rom_bin_end: u8;
    static _binary_umac_disc_bin_start: u8;
    static _binary_umac_disc_bin_end: u8;
}

fn embedded(start: *const u8, end: *const u8) -> &'static [u8] {
    // SAFETY: símbolos do linker delimitando dados somente leitura na flash.
    unsafe { slice::from_raw_parts(start, end as usize - start as usize) }
}

fn embedded_rom() -> &'static [u8] {
    unsafe { embedded(addr_of!(_binary_umac_rom_bin_start), addr_of!(_binary_umac_rom_bin_end)) }
}

fn embedded_disc() -> &'static [u8] {
    unsafe { embedded(addr_of!(_binary_umac_disc_bin_start), addr_of!(_binary_umac_disc_bin_end)) }
}

/// RAM do Mac: janela cacheada do CS1 (PSRAM) ou array na SRAM.
fn emulated_ram(report: &BootReport) -> (*mut u8, usize) {
    if report.psram_backed() {
        (picomac::hal::regs::xip::M1_BASE as usize as *mut u8, report.ram_size())
    } else {
        (addr_of_mut!(SRAM_RAM).cast(), config::FALLBACK_RAM_SIZE)
    }
}

/// LED da placa como indicador de atividade do disco.
struct BoardLed(gpio::Led);

impl ActivityLed for BoardLed {
    fn set(&mut self, on: bool) {
        // SAFETY: escrita atômica (alias SET/CLR) num único pino.
        let mut bus = unsafe { MmioBus::steal() };
        self.0.set(&mut bus, on);
    }
}

unsafe extern "C" fn disc_read(_ctx: *mut c_void, data: *mut u8, offset: u32, len: u32) -> i32 {
    match DISC.get() {
        Some(disc) => umac::disc_read_into(&mut *disc.lock(), data, offset, len),
        None => Errno::ENODEV.as_status(),
    }
}

unsafe extern "C" fn disc_write(_ctx: *mut c_void, data: *mut u8, offset: u32, len: u32) -> i32 {
    match DISC.get() {
        Some(disc) => umac::disc_write_from(&mut *disc.lock(), data, offset, len),
        None => Errno::ENODEV.as_status(),
    }
}

// =============================================================================
// CORE 0
// =============================================================================

#[no_mangle]
pub extern "C" fn boot_main() -> ! {
    // SAFETY: único código rodando; core 1 ainda parado.
    let mut bus = unsafe { MmioBus::steal() };

    let report = match bring_up(&mut bus) {
        Ok(report) => report,
        Err(e) => fatal(e.as_str()),
    };
    if config::USE_PSRAM && !report.psram_backed() {
        picomac::kwarn!("(Boot) PSRAM ausente, RAM emulada na SRAM, bytes: "; report.ram_size());
    }

    #[cfg(feature = "self_test")]
    if !picomac::core::selftest::run_boot_tests() {
        fatal("(Boot) Self-test falhou");
    }

    if config::ENABLE_AUDIO {
        match audio::setup(&mut bus, &report.clocks) {
            Ok(codec) => *CODEC.lock() = Some(codec),
            Err(e) => fatal(e.as_str()),
        }
    }

    BOOT.call_once(|| report);
    if launch_core1(&mut bus, core1_entry).is_err() {
        fatal("(Boot) Core 1 nao respondeu");
    }

    let Some(usb) = usb::TinyUsb::init() else {
        fatal("(USB) Falha ao iniciar o host");
    };
    IoLoop::new(usb).run()
}

// =============================================================================
// CORE 1
// =============================================================================

extern "C" fn core1_entry() -> ! {
    picomac::kinfo!("(Core1) Iniciado");
    let Some(report) = BOOT.get() else {
        fatal("(Core1) Bring-up nao publicado");
    };

    // SAFETY: o pino do LED é exclusivo do disco.
    let mut bus = unsafe { MmioBus::steal() };
    let led = BoardLed(gpio::Led::new(&mut bus, config::PIN_LED));
    let mut volume = sd::SdVolume;
    let volume = if config::USE_SD { Some(&mut volume) } else { None };
    let disc = DISC.call_once(|| Mutex::new(select_disc(volume, embedded_disc(), led)));

    // SAFETY: DISCS é preenchido aqui e, depois, só lido pelo núcleo.
    let discs = unsafe { &mut *addr_of_mut!(DISCS) };
    discs[0] = umac::describe(&*disc.lock(), disc_read, disc_write);
    let (ram, ram_size) = emulated_ram(report);
    // SAFETY: a RAM emulada pertence só ao núcleo.
    let core = unsafe { UmacCore::init(ram, ram_size, embedded_rom(), discs) };

    let mirror = if report.mirror_framebuffer() {
        // SAFETY: o espelho só é escrito por este core.
        let buffer = unsafe { &mut *addr_of_mut!(MIRROR) };
        Some(MirrorStage {
            geometry: config::GEOMETRY,
            buffer: &mut buffer[..],
        })
    } else {
        None
    };
    let scan_base = match mirror.as_ref() {
        Some(m) => m.buffer.as_ptr(),
        None => core.framebuffer_ptr(),
    };
    video::DviScanOut.start(scan_base);

    let audio = match (CODEC.lock().take(), audio::POOL.get()) {
        (Some(codec), Some(pool)) => Some(AudioStage {
            producer: AudioBufferProducer::new(codec),
            pool,
        }),
        _ => None,
    };

    picomac::kok!("(Core1) Emulacao iniciada");
    EventLoop::new(core, SystemTimer, &INPUT, audio, mirror).run()
}
