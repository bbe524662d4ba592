/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 18/06/2021
Last Modified: 04/02/2023
License: MIT
*/
use crate::records::OutputRecord;

/// The narrow interface between the analysis engine and its host. The
/// engine pushes progress notices, feedback messages, and output records
/// through it, and polls for cooperative cancellation at each progress
/// update. Records are only returned once all computation has finished, so
/// a cancelled run never yields partial output.
pub trait Reporter {
    fn progress(&mut self, label: &str, percent: usize);
    fn feedback(&mut self, message: &str);
    fn return_record(&mut self, record: OutputRecord);
    fn cancel_requested(&self) -> bool;
}

/// A reporter that prints progress and feedback to standard output, in the
/// style of command-line tool output. Returned records are discarded;
/// callers that consume records should supply their own reporter.
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> ConsoleReporter {
        ConsoleReporter { verbose: verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&mut self, label: &str, percent: usize) {
        if self.verbose {
            println!("{} {}%", label, percent);
        }
    }

    fn feedback(&mut self, message: &str) {
        if self.verbose {
            println!("{}", message);
        }
    }

    fn return_record(&mut self, _record: OutputRecord) {}

    fn cancel_requested(&self) -> bool {
        false
    }
}

/// A reporter that accumulates returned records and feedback messages in
/// memory, for hosts that write the records out afterwards.
pub struct RecordCollector {
    pub records: Vec<OutputRecord>,
    pub messages: Vec<String>,
}

impl RecordCollector {
    pub fn new() -> RecordCollector {
        RecordCollector {
            records: vec![],
            messages: vec![],
        }
    }
}

impl Reporter for RecordCollector {
    fn progress(&mut self, _label: &str, _percent: usize) {}

    fn feedback(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn return_record(&mut self, record: OutputRecord) {
        self.records.push(record);
    }

    fn cancel_requested(&self) -> bool {
        false
    }
}
