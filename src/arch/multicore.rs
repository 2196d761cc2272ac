//! Lançamento do core 1 pelo FIFO inter-core do SIO.
//!
//! O boot ROM mantém o core 1 dormindo até receber a sequência
//! `[0, 0, 1, vtor, sp, entry]`, ecoando cada palavra. Eco diferente do
//! enviado reinicia a sequência do início.

use crate::hal::regs::sio;
use crate::hal::{RegisterBus, SPIN_LIMIT};

/// Tentativas máximas antes de desistir (eco sempre errado).
const MAX_ATTEMPTS: u32 = 64;

/// Falha no handshake com o core 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchError;

/// Sequência de comandos do handshake.
pub const fn launch_sequence(vtor: u32, sp: u32, entry: u32) -> [u32; 6] {
    [0, 0, 1, vtor, sp, entry]
}

/// Esvazia o FIFO de leitura, no máximo `SPIN_LIMIT` palavras.
fn fifo_drain<B: RegisterBus>(bus: &mut B) -> Result<(), LaunchError> {
    for _ in 0..SPIN_LIMIT {
        if bus.read(sio::FIFO_ST) & sio::FIFO_ST_VLD == 0 {
            return Ok(());
        }
        let _ = bus.read(sio::FIFO_RD);
    }
    crate::kwarn!("(SMP) FIFO nunca esvaziou");
    Err(LaunchError)
}

fn fifo_push<B: RegisterBus>(bus: &mut B, value: u32) -> Result<(), LaunchError> {
    crate::hal::wait_for(bus, sio::FIFO_ST, sio::FIFO_ST_RDY, sio::FIFO_ST_RDY)
        .map_err(|_| LaunchError)?;
    bus.write(sio::FIFO_WR, value);
    Ok(())
}

fn fifo_pop<B: RegisterBus>(bus: &mut B) -> Result<u32, LaunchError> {
    crate::hal::wait_for(bus, sio::FIFO_ST, sio::FIFO_ST_VLD, sio::FIFO_ST_VLD)
        .map_err(|_| LaunchError)?;
    Ok(bus.read(sio::FIFO_RD))
}

/// Executa o handshake. `wake` é chamado sempre que um 0 é enviado
/// (SEV no hardware, para tirar o core 1 do WFE).
pub fn launch<B: RegisterBus, F: FnMut()>(
    bus: &mut B,
    vtor: u32,
    sp: u32,
    entry: u32,
    mut wake: F,
) -> Result<(), LaunchError> {
    let seq = launch_sequence(vtor, sp, entry);
    let mut idx = 0;
    let mut attempts = 0;

    while idx < seq.len() {
        let cmd = seq[idx];
        if cmd == 0 {
            fifo_drain(bus)?;
            wake();
        }
        fifo_push(bus, cmd)?;
        let response = fifo_pop(bus)?;

        if response == cmd {
            idx += 1;
        } else {
            idx = 0;
            attempts += 1;
            if attempts >= MAX_ATTEMPTS {
                crate::kerror!("(SMP) Core 1 nao respondeu ao handshake");
                return Err(LaunchError);
            }
        }
    }

    crate::kok!("(SMP) Core 1 iniciado");
    Ok(())
}
