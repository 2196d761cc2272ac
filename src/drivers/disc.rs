// =============================================================================
// DISCO DO EMULADOR
// =============================================================================
//
// Exatamente uma de duas origens:
// - Imagem no armazenamento (cartão SD, FAT): leitura/escrita, a menos que o
//   nome seja `umac0ro.img`. O LED da placa acende durante cada operação.
// - Imagem embutida no binário: sempre somente leitura.
//
// O sistema de arquivos é externo (`Volume`); aqui só se escolhe a imagem
// e se oferece uma interface única de leitura/escrita por offset.
//
// =============================================================================

use crate::klib::glob;
use crate::sys::Errno;

/// Imagens candidatas no volume.
pub const IMAGE_PATTERN: &str = "umac0*.img";
/// Nome que força montagem somente leitura.
pub const READ_ONLY_NAME: &str = "umac0ro.img";

const NAME_MAX: usize = 64;

/// Nome de arquivo de tamanho fixo.
#[derive(Clone, Copy)]
pub struct FileName {
    buf: [u8; NAME_MAX],
    len: usize,
}

impl FileName {
    /// `None` se não couber.
    pub fn new(name: &str) -> Option<Self> {
        if name.len() > NAME_MAX {
            return None;
        }
        let mut buf = [0u8; NAME_MAX];
        buf[..name.len()].copy_from_slice(name.as_bytes());
        Some(Self {
            buf,
            len: name.len(),
        })
    }

    pub fn as_str(&self) -> &str {
        // Construído a partir de &str: sempre UTF-8 válido
        ::core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

/// Arquivo aberto com acesso aleatório.
pub trait DiscIo {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Errno>;
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<(), Errno>;
    fn size(&self) -> u64;
}

/// Sistema de arquivos montável (externo).
pub trait Volume {
    type File: DiscIo;

    fn mount(&mut self) -> Result<(), Errno>;
    /// Lista os nomes da raiz, em ordem do diretório.
    fn for_each_entry(&mut self, f: &mut dyn FnMut(&str) -> bool) -> Result<(), Errno>;
    fn open(&mut self, name: &str) -> Result<Self::File, Errno>;
}

/// LED de atividade.
pub trait ActivityLed {
    fn set(&mut self, on: bool);
}

/// Envolve um `DiscIo` acendendo o LED durante cada operação.
pub struct LedIo<F: DiscIo, L: ActivityLed> {
    inner: F,
    led: L,
}

impl<F: DiscIo, L: ActivityLed> LedIo<F, L> {
    pub fn new(inner: F, led: L) -> Self {
        Self { inner, led }
    }
}

impl<F: DiscIo, L: ActivityLed> DiscIo for LedIo<F, L> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Errno> {
        self.led.set(true);
        let r = self.inner.read_at(offset, buf);
        self.led.set(false);
        if r.is_err() {
            crate::kwarn!("(Disc) Falha de leitura no offset ", offset);
        }
        r
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<(), Errno> {
        self.led.set(true);
        let r = self.inner.write_at(offset, buf);
        self.led.set(false);
        if r.is_err() {
            crate::kwarn!("(Disc) Falha de escrita no offset ", offset);
        }
        r
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

// =============================================================================
// DESCRITOR
// =============================================================================

pub enum DiscDescriptor<F: DiscIo> {
    /// Imagem em memória, somente leitura.
    Image(&'static [u8]),
    /// Arquivo no armazenamento.
    Backed { io: F, size: u64, read_only: bool },
}

impl<F: DiscIo> DiscDescriptor<F> {
    pub fn size(&self) -> u64 {
        match self {
            Self::Image(data) => data.len() as u64,
            Self::Backed { size, .. } => *size,
        }
    }

    pub fn is_read_only(&self) -> bool {
        match self {
            Self::Image(_) => true,
            Self::Backed { read_only, .. } => *read_only,
        }
    }

    pub fn is_backed(&self) -> bool {
        matches!(self, Self::Backed { .. })
    }

    fn check_range(&self, offset: u64, len: usize) -> Result<(), Errno> {
        match offset.checked_add(len as u64) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(Errno::EINVAL),
        }
    }

    pub fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Errno> {
        self.check_range(offset, buf.len())?;
        match self {
            Self::Image(data) => {
                let start = offset as usize;
                buf.copy_from_slice(&data[start..start + buf.len()]);
                Ok(())
            }
            Self::Backed { io, .. } => io.read_at(offset, buf),
        }
    }

    pub fn write(&mut self, offset: u64, buf: &[u8]) -> Result<(), Errno> {
        if self.is_read_only() {
            return Err(Errno::EROFS);
        }
        self.check_range(offset, buf.len())?;
        match self {
            Self::Image(_) => Err(Errno::EROFS),
            Self::Backed { io, .. } => io.write_at(offset, buf),
        }
    }
}

// =============================================================================
// SELEÇÃO
// =============================================================================

/// Primeira entrada da raiz que casa com `IMAGE_PATTERN`.
fn find_image<V: Volume>(volume: &mut V) -> Result<FileName, Errno> {
    let mut found = None;
    volume.for_each_entry(&mut |name| {
        if glob::matches(IMAGE_PATTERN, name) {
            found = FileName::new(name);
            found.is_none()
        } else {
            true
        }
    })?;
    found.ok_or(Errno::ENOENT)
}

fn open_backed<V: Volume, L: ActivityLed>(
    volume: &mut V,
    led: L,
) -> Result<DiscDescriptor<LedIo<V::File, L>>, Errno> {
    volume.mount().map_err(|e| {
        crate::kwarn!("(Disc) Falha ao montar volume");
        e
    })?;

    let name = find_image(volume)?;
    let read_only = name.as_str().eq_ignore_ascii_case(READ_ONLY_NAME);
    crate::klog!("(Disc) Abrindo ");
    crate::klog!(name.as_str());
    crate::klog!(if read_only { " (RO)" } else { " (RW)" });
    crate::knl!();

    let file = volume.open(name.as_str())?;
    let size = file.size();
    crate::kinfo!("(Disc) Tamanho: "; size);
    Ok(DiscDescriptor::Backed {
        io: LedIo::new(file, led),
        size,
        read_only,
    })
}

/// Escolhe o disco 0: imagem no volume, senão a embutida.
pub fn select_disc<V: Volume, L: ActivityLed>(
    volume: Option<&mut V>,
    embedded: &'static [u8],
    led: L,
) -> DiscDescriptor<LedIo<V::File, L>> {
    if let Some(volume) = volume {
        match open_backed(volume, led) {
            Ok(desc) => return desc,
            Err(e) => {
                crate::kwarn!("(Disc) Sem imagem no volume:");
                crate::kwarn!(e.as_str());
            }
        }
    }
    crate::kinfo!("(Disc) Usando imagem embutida (RO)");
    DiscDescriptor::Image(embedded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::string::String;
    use std::vec::Vec;

    struct MemFile {
        data: Vec<u8>,
        fail: bool,
    }

    impl DiscIo for MemFile {
        fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Errno> {
            if self.fail {
                return Err(Errno::EIO);
            }
            let o = offset as usize;
            buf.copy_from_slice(&self.data[o..o + buf.len()]);
            Ok(())
        }

        fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<(), Errno> {
            if self.fail {
                return Err(Errno::EIO);
            }
            let o = offset as usize;
            self.data[o..o + buf.len()].copy_from_slice(buf);
            Ok(())
        }

        fn size(&self) -> u64 {
            self.data.len() as u64
        }
    }

    struct MemVolume {
        mountable: bool,
        names: Vec<&'static str>,
        fail_io: bool,
        opened: Option<String>,
    }

    impl MemVolume {
        fn with(names: Vec<&'static str>) -> Self {
            Self {
                mountable: true,
                names,
                fail_io: false,
                opened: None,
            }
        }
    }

    impl Volume for MemVolume {
        type File = MemFile;

        fn mount(&mut self) -> Result<(), Errno> {
            if self.mountable {
                Ok(())
            } else {
                Err(Errno::ENODEV)
            }
        }

        fn for_each_entry(&mut self, f: &mut dyn FnMut(&str) -> bool) -> Result<(), Errno> {
            for name in &self.names {
                if !f(name) {
                    break;
                }
            }
            Ok(())
        }

        fn open(&mut self, name: &str) -> Result<MemFile, Errno> {
            self.opened = Some(String::from(name));
            Ok(MemFile {
                data: (0..=255u8).cycle().take(4096).collect(),
                fail: self.fail_io,
            })
        }
    }

    #[derive(Clone, Default)]
    struct Led(Rc<RefCell<Vec<bool>>>);

    impl ActivityLed for Led {
        fn set(&mut self, on: bool) {
            self.0.borrow_mut().push(on);
        }
    }

    static EMBEDDED: [u8; 1024] = [0xaa; 1024];

    #[test]
    fn test_picks_first_matching_image() {
        let mut vol = MemVolume::with(vec!["readme.txt", "umac1.img", "umac0rw.img", "umac0.img"]);
        let disc = select_disc(Some(&mut vol), &EMBEDDED, Led::default());

        assert!(disc.is_backed());
        assert!(!disc.is_read_only());
        assert_eq!(disc.size(), 4096);
        assert_eq!(vol.opened.as_deref(), Some("umac0rw.img"));
    }

    #[test]
    fn test_ro_name_mounts_read_only() {
        let mut vol = MemVolume::with(vec!["umac0ro.img"]);
        let mut disc = select_disc(Some(&mut vol), &EMBEDDED, Led::default());

        assert!(disc.is_backed());
        assert!(disc.is_read_only());
        assert_eq!(disc.write(0, &[1, 2, 3]), Err(Errno::EROFS));
    }

    #[test]
    fn test_falls_back_to_embedded_image() {
        let mut unmountable = MemVolume::with(vec!["umac0.img"]);
        unmountable.mountable = false;
        let disc = select_disc(Some(&mut unmountable), &EMBEDDED, Led::default());
        assert!(!disc.is_backed());

        let mut empty = MemVolume::with(vec!["other.img"]);
        let mut disc = select_disc(Some(&mut empty), &EMBEDDED, Led::default());
        assert!(disc.is_read_only());
        assert_eq!(disc.size(), 1024);

        let mut buf = [0u8; 4];
        disc.read(1020, &mut buf).unwrap();
        assert_eq!(buf, [0xaa; 4]);
        assert_eq!(disc.read(1022, &mut buf), Err(Errno::EINVAL));
        assert_eq!(disc.write(0, &buf), Err(Errno::EROFS));

        let none: Option<&mut MemVolume> = None;
        assert!(!select_disc(none, &EMBEDDED, Led::default()).is_backed());
    }

    #[test]
    fn test_led_wraps_each_operation() {
        let led = Led::default();
        let mut vol = MemVolume::with(vec!["umac0.img"]);
        let mut disc = select_disc(Some(&mut vol), &EMBEDDED, led.clone());

        let mut buf = [0u8; 2];
        disc.read(256, &mut buf).unwrap();
        assert_eq!(buf, [0, 1]);
        disc.write(0, &[9]).unwrap();
        disc.read(0, &mut buf[..1]).unwrap();
        assert_eq!(buf[0], 9);
        assert_eq!(*led.0.borrow(), [true, false, true, false, true, false]);
    }

    #[test]
    fn test_io_failure_reports_errno() {
        let led = Led::default();
        let mut vol = MemVolume::with(vec!["umac0.img"]);
        vol.fail_io = true;
        let mut disc = select_disc(Some(&mut vol), &EMBEDDED, led.clone());

        let mut buf = [0u8; 8];
        assert_eq!(disc.read(0, &mut buf), Err(Errno::EIO));
        assert_eq!(*led.0.borrow(), [true, false]);
    }
}
