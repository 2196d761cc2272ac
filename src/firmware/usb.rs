//! USB host (TinyUSB + PIO-USB, lado C) e a entrada HID.
//!
//! O app HID em C traduz relatórios de mouse/teclado e chama os
//! `picomac_*` abaixo; o core 1 consome pelo `INPUT` compartilhado.

use picomac::core::scheduler::UsbHost;
use picomac::drivers::input::{KeyEvent, INPUT};

extern "C" {
    /// Configura o PIO-USB e chama `tuh_init`.
    fn picomac_usb_host_init() -> bool;
    fn tuh_task();
    fn hid_app_task();
}

pub struct TinyUsb;

impl TinyUsb {
    pub fn init() -> Option<Self> {
        if unsafe { picomac_usb_host_init() } {
            picomac::kok!("(USB) Host pronto");
            Some(Self)
        } else {
            None
        }
    }
}

impl UsbHost for TinyUsb {
    fn task(&mut self) {
        unsafe { tuh_task() }
    }

    fn hid_task(&mut self) {
        unsafe { hid_app_task() }
    }
}

#[no_mangle]
pub extern "C" fn picomac_mouse_move(dx: i32, dy: i32) {
    INPUT.cursor.move_by(dx, dy);
}

#[no_mangle]
pub extern "C" fn picomac_mouse_buttons(mask: u8) {
    INPUT.cursor.set_buttons(mask);
}

/// `false` se a fila de teclas estava cheia.
#[no_mangle]
pub extern "C" fn picomac_key_event(code: u8, release: bool) -> bool {
    INPUT.keys.push(KeyEvent { code, release })
}
