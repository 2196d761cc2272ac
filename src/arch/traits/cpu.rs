//! Interface Abstrata de CPU.
//! Define as operações que cada plataforma (RP2350, host de testes) implementa.

pub trait CpuOps {
    /// Para a execução da CPU até a próxima interrupção (WFI).
    fn halt();

    /// Desabilita interrupções globalmente (CPSID I).
    fn disable_interrupts();

    /// Habilita interrupções globalmente (CPSIE I).
    fn enable_interrupts();

    /// Verifica se as interrupções estão habilitadas.
    fn are_interrupts_enabled() -> bool;

    /// Salva o estado de máscara (PRIMASK) e desabilita interrupções.
    fn save_and_disable_interrupts() -> u32;

    /// Restaura o estado salvo por `save_and_disable_interrupts`.
    fn restore_interrupts(state: u32);

    /// Uma instrução NOP. Usada em atrasos mais curtos que qualquer timer.
    fn nop();

    /// Entra em loop infinito de halt com interrupções desabilitadas.
    /// Usado em erros fatais.
    fn hang() -> ! {
        Self::disable_interrupts();
        loop {
            Self::halt();
        }
    }
}
