//! Assertion sink: records pass/fail outcomes and the end-of-test signal

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Destination for test assertions
pub trait AssertionSink: Send {
    /// Record one outcome
    fn assert(&mut self, condition: bool, message: &str);

    /// Signal that the expected assertion sequence is complete
    fn result(&mut self);

    /// Snapshot of everything recorded so far
    fn report(&self) -> AssertionReport;
}

/// One recorded assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionRecord {
    pub passed: bool,
    pub message: String,
}

/// Outcome of a test run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionReport {
    pub records: Vec<AssertionRecord>,
    pub passed: u32,
    pub failed: u32,
    /// Number of times `result()` was signalled
    pub result_calls: u32,
}

impl AssertionReport {
    pub fn total(&self) -> u32 {
        self.passed + self.failed
    }

    pub fn completed(&self) -> bool {
        self.result_calls > 0
    }

    /// Completed with no failed assertion
    pub fn all_passed(&self) -> bool {
        self.completed() && self.failed == 0
    }

    /// How many times an assertion with this message was recorded
    pub fn count(&self, message: &str) -> usize {
        self.records.iter().filter(|r| r.message == message).count()
    }

    pub fn summary(&self) -> String {
        format!("TOTAL: {} of {} passed", self.passed, self.total())
    }
}

/// Sink that prints each outcome as it is recorded
pub struct ConsoleAssertionSink {
    report: AssertionReport,
    use_color: bool,
    to_stderr: bool,
    silent: bool,
}

impl ConsoleAssertionSink {
    pub fn new(use_color: bool) -> Self {
        Self {
            report: AssertionReport::default(),
            use_color,
            to_stderr: false,
            silent: false,
        }
    }

    /// Print to stderr so stdout carries only the final report
    pub fn to_stderr(mut self) -> Self {
        self.to_stderr = true;
        self
    }

    /// Record without printing
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::new(false)
        }
    }

    fn emit(&self, line: String) {
        if self.silent {
            return;
        }
        if self.to_stderr {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }

    fn format_outcome(&self, passed: bool, message: &str) -> String {
        let label = match (passed, self.use_color) {
            (true, true) => "pass".green().bold().to_string(),
            (false, true) => "fail".red().bold().to_string(),
            (true, false) => "pass".to_string(),
            (false, false) => "fail".to_string(),
        };
        format!("{} - {}", label, message)
    }
}

impl AssertionSink for ConsoleAssertionSink {
    fn assert(&mut self, condition: bool, message: &str) {
        if condition {
            self.report.passed += 1;
        } else {
            self.report.failed += 1;
        }
        self.report.records.push(AssertionRecord {
            passed: condition,
            message: message.to_string(),
        });

        self.emit(self.format_outcome(condition, message));
    }

    fn result(&mut self) {
        self.report.result_calls += 1;

        let summary = self.report.summary();
        let line = if !self.use_color {
            summary
        } else if self.report.failed == 0 {
            summary.green().to_string()
        } else {
            summary.red().to_string()
        };
        self.emit(line);
    }

    fn report(&self) -> AssertionReport {
        self.report.clone()
    }
}
