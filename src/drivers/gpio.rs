//! GPIO: seleção de função, saída via SIO e LED da placa.

use crate::hal::regs::{io_bank0, pads_bank0, sio};
use crate::hal::RegisterBus;

/// Seleciona a função do pino e libera o pad (IE, sem isolamento).
pub fn set_function<B: RegisterBus>(bus: &mut B, pin: u32, func: u32) {
    bus.write_masked(
        pads_bank0::pad(pin),
        pads_bank0::IE,
        pads_bank0::IE | pads_bank0::OD,
    );
    bus.write(io_bank0::ctrl(pin), func & io_bank0::FUNCSEL_MASK);
    bus.clear_bits(pads_bank0::pad(pin), pads_bank0::ISO);
}

/// Pino de I2C: função I2C com pull-up.
pub fn set_i2c_function<B: RegisterBus>(bus: &mut B, pin: u32) {
    set_function(bus, pin, io_bank0::FUNC_I2C);
    bus.set_bits(pads_bank0::pad(pin), pads_bank0::PUE);
}

/// SIO separa os pinos 0-31 e 32-47 em registradores distintos.
fn sio_reg(pin: u32, low: u32, high: u32) -> (u32, u32) {
    if pin < 32 {
        (low, 1 << pin)
    } else {
        (high, 1 << (pin - 32))
    }
}

/// Configura o pino como saída SIO.
pub fn init_output<B: RegisterBus>(bus: &mut B, pin: u32) {
    let (clr, mask) = sio_reg(pin, sio::GPIO_OUT_CLR, sio::GPIO_HI_OUT_CLR);
    bus.write(clr, mask);
    let (oe, mask) = sio_reg(pin, sio::GPIO_OE_SET, sio::GPIO_HI_OE_SET);
    bus.write(oe, mask);
    set_function(bus, pin, io_bank0::FUNC_SIO);
}

/// Nível de saída. SIO tem registradores SET/CLR próprios (sem alias).
pub fn put<B: RegisterBus>(bus: &mut B, pin: u32, high: bool) {
    let (reg, mask) = if high {
        sio_reg(pin, sio::GPIO_OUT_SET, sio::GPIO_HI_OUT_SET)
    } else {
        sio_reg(pin, sio::GPIO_OUT_CLR, sio::GPIO_HI_OUT_CLR)
    };
    bus.write(reg, mask);
}

/// LED de atividade.
pub struct Led {
    pin: u32,
}

impl Led {
    pub fn new<B: RegisterBus>(bus: &mut B, pin: u32) -> Self {
        init_output(bus, pin);
        Self { pin }
    }

    pub fn set<B: RegisterBus>(&self, bus: &mut B, on: bool) {
        put(bus, self.pin, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimBus;

    #[test]
    fn test_high_bank_pin_uses_hi_registers() {
        let mut bus = SimBus::new();
        put(&mut bus, 47, true);
        assert_eq!(bus.writes_to(sio::GPIO_HI_OUT_SET), [1 << 15]);
    }

    #[test]
    fn test_led_toggles() {
        let mut bus = SimBus::new();
        let led = Led::new(&mut bus, 29);
        led.set(&mut bus, true);
        led.set(&mut bus, false);
        assert_eq!(bus.writes_to(sio::GPIO_OUT_SET), [1 << 29]);
        assert_eq!(bus.writes_to(sio::GPIO_OUT_CLR), [1 << 29, 1 << 29]);
        assert_eq!(bus.peek(io_bank0::ctrl(29)), io_bank0::FUNC_SIO);
    }
}
