//! Testes de Boot (feature `self_test`)
//!
//! Conferem no próprio chip as tabelas e cálculos de que o bring-up
//! depende, antes de lançar o core 1.

use crate::klib::test_framework::{run_test_suite, TestCase, TestResult};

/// Executa a suite. `true` se nada falhou.
pub fn run_boot_tests() -> bool {
    crate::kinfo!("(Test) Verificacao de boot");
    let summary = run_test_suite("boot", BOOT_TESTS);
    if !summary.all_passed() {
        crate::kerror!("(Test) Falhas: "; summary.failed);
    }
    summary.all_passed()
}

const BOOT_TESTS: &[TestCase] = &[
    TestCase {
        name: "pll: 126 MHz exato",
        func: test_pll_search,
    },
    TestCase {
        name: "psram: timing a 264 MHz",
        func: test_psram_timing,
    },
    TestCase {
        name: "disc: padrao de imagem",
        func: test_disc_pattern,
    },
    TestCase {
        name: "audio: conversao de amostra",
        func: test_audio_sample,
    },
];

fn test_pll_search() -> TestResult {
    use crate::drivers::clocks::PllConfig;
    TestResult::from_check(PllConfig::search(126_000).is_some_and(|c| c.output_khz() == 126_000))
}

fn test_psram_timing() -> TestResult {
    use crate::drivers::qmi::psram::{TimingParameters, APS6404};
    let t = TimingParameters::derive(264_000_000, &APS6404);
    TestResult::from_check(t.clkdiv == 2 && t.rxdelay == 2 && t.min_deselect == 14)
}

fn test_disc_pattern() -> TestResult {
    use crate::drivers::disc::{IMAGE_PATTERN, READ_ONLY_NAME};
    use crate::klib::glob::matches;
    TestResult::from_check(matches(IMAGE_PATTERN, READ_ONLY_NAME) && !matches(IMAGE_PATTERN, "umac1.img"))
}

fn test_audio_sample() -> TestResult {
    use crate::drivers::audio::{convert_sample, volume_scale};
    let scale = volume_scale(7, false);
    TestResult::from_check(convert_sample(0x80, scale) == 0 && convert_sample(0xff, scale) == 127 * 256)
}
