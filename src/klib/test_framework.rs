//! Suite de verificação executada no chip (feature `self_test`).
//!
//! Cada caso é uma função sem argumentos; o resultado vai para a UART
//! como `[OK]`/`[FAIL]`/`[SKIP]` e o total volta em `SuiteSummary`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    /// Pré-condição de hardware ausente (ex.: PSRAM não montada).
    Skipped,
}

impl TestResult {
    pub fn from_check(ok: bool) -> Self {
        if ok {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, name: &str, result: TestResult) {
        match result {
            TestResult::Passed => {
                crate::kok!(name);
                self.passed += 1;
            }
            TestResult::Failed => {
                crate::kfail!(name);
                self.failed += 1;
            }
            TestResult::Skipped => {
                crate::klog!("[SKIP] ");
                crate::klog!(name);
                crate::knl!();
                self.skipped += 1;
            }
        }
    }
}

/// Roda `tests` em ordem, sem parar na primeira falha.
pub fn run_test_suite(suite: &str, tests: &[TestCase]) -> SuiteSummary {
    crate::klog!("--- ");
    crate::klog!(suite);
    crate::klog!(" ("; tests.len());
    crate::klog!(" casos)");
    crate::knl!();

    let mut summary = SuiteSummary::default();
    for test in tests {
        summary.record(test.name, (test.func)());
    }

    crate::klog!("ok="; summary.passed);
    crate::klog!(" falhas="; summary.failed);
    crate::klog!(" pulados="; summary.skipped);
    crate::knl!();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> TestResult {
        TestResult::Passed
    }

    fn fail() -> TestResult {
        TestResult::from_check(false)
    }

    fn skip() -> TestResult {
        TestResult::Skipped
    }

    #[test]
    fn test_suite_counts_every_case() {
        let cases = [
            TestCase { name: "a", func: pass },
            TestCase { name: "b", func: fail },
            TestCase { name: "c", func: skip },
            TestCase { name: "d", func: pass },
        ];
        let summary = run_test_suite("host", &cases);
        assert_eq!(
            summary,
            SuiteSummary {
                passed: 2,
                failed: 1,
                skipped: 1
            }
        );
        assert!(!summary.all_passed());
    }
}
