//! Barramento de registradores de 32 bits.

/// Acesso a registradores mapeados em memória.
///
/// As operações de bit têm implementação padrão por read-modify-write;
/// `MmioBus` sobrescreve com os aliases atômicos do hardware.
pub trait RegisterBus {
    /// Leitura de 32 bits.
    fn read(&mut self, addr: u32) -> u32;

    /// Escrita de 32 bits.
    fn write(&mut self, addr: u32, value: u32);

    /// `*addr |= mask`
    fn set_bits(&mut self, addr: u32, mask: u32) {
        let value = self.read(addr);
        self.write(addr, value | mask);
    }

    /// `*addr &= !mask`
    fn clear_bits(&mut self, addr: u32, mask: u32) {
        let value = self.read(addr);
        self.write(addr, value & !mask);
    }

    /// Substitui apenas os bits de `mask` por `value`.
    fn write_masked(&mut self, addr: u32, value: u32, mask: u32) {
        let current = self.read(addr);
        self.write(addr, (current & !mask) | (value & mask));
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read(&mut self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }

    fn set_bits(&mut self, addr: u32, mask: u32) {
        (**self).set_bits(addr, mask)
    }

    fn clear_bits(&mut self, addr: u32, mask: u32) {
        (**self).clear_bits(addr, mask)
    }

    fn write_masked(&mut self, addr: u32, value: u32, mask: u32) {
        (**self).write_masked(addr, value, mask)
    }
}
