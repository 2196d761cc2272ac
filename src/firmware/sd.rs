//! Cartão SD (FAT) como `Volume`.
//!
//! O FatFs e o driver SPI ficam do lado C; a ponte expõe um único diretório
//! (a raiz) e arquivos por handle. Todas as funções devolvem 0 (ou valor
//! não negativo) em sucesso.

use picomac::drivers::disc::{DiscIo, Volume};
use picomac::sys::Errno;

extern "C" {
    fn picomac_sd_mount() -> i32;
    fn picomac_sd_opendir() -> i32;
    /// Tamanho do próximo nome, 0 no fim, negativo em erro.
    fn picomac_sd_readdir(buf: *mut u8, cap: u32) -> i32;
    fn picomac_sd_closedir();
    fn picomac_sd_open(name: *const u8, len: u32) -> i32;
    fn picomac_sd_size(handle: i32) -> u32;
    fn picomac_sd_read(handle: i32, offset: u32, buf: *mut u8, len: u32) -> i32;
    fn picomac_sd_write(handle: i32, offset: u32, buf: *const u8, len: u32) -> i32;
}

const NAME_BUF: usize = 256;

pub struct SdVolume;

pub struct SdFile {
    handle: i32,
    size: u64,
}

impl Volume for SdVolume {
    type File = SdFile;

    fn mount(&mut self) -> Result<(), Errno> {
        picomac::kinfo!("(SD) Montando FAT");
        let fr = unsafe { picomac_sd_mount() };
        if fr != 0 {
            picomac::kwarn!("(SD) mount: "; fr);
            return Err(Errno::ENODEV);
        }
        Ok(())
    }

    fn for_each_entry(&mut self, f: &mut dyn FnMut(&str) -> bool) -> Result<(), Errno> {
        if unsafe { picomac_sd_opendir() } != 0 {
            return Err(Errno::EIO);
        }
        let mut buf = [0u8; NAME_BUF];
        let mut result = Ok(());
        loop {
            let n = unsafe { picomac_sd_readdir(buf.as_mut_ptr(), NAME_BUF as u32) };
            if n < 0 {
                result = Err(Errno::EIO);
                break;
            }
            if n == 0 {
                break;
            }
            let len = (n as usize).min(NAME_BUF);
            // Nomes não UTF-8 não casam com nenhum padrão
            let Ok(name) = ::core::str::from_utf8(&buf[..len]) else {
                continue;
            };
            if !f(name) {
                break;
            }
        }
        unsafe { picomac_sd_closedir() };
        result
    }

    fn open(&mut self, name: &str) -> Result<SdFile, Errno> {
        let handle = unsafe { picomac_sd_open(name.as_ptr(), name.len() as u32) };
        if handle < 0 {
            return Err(Errno::ENOENT);
        }
        let size = unsafe { picomac_sd_size(handle) } as u64;
        Ok(SdFile { handle, size })
    }
}

impl DiscIo for SdFile {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Errno> {
        let fr = unsafe {
            picomac_sd_read(self.handle, offset as u32, buf.as_mut_ptr(), buf.len() as u32)
        };
        if fr == 0 {
            Ok(())
        } else {
            Err(Errno::EIO)
        }
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<(), Errno> {
        let fr = unsafe {
            picomac_sd_write(self.handle, offset as u32, buf.as_ptr(), buf.len() as u32)
        };
        if fr == 0 {
            Ok(())
        } else {
            Err(Errno::EIO)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
