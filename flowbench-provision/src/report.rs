//! Reports the result of a provisioning run to the calling driver.
//!
//! The identifiers go to standard output as marker lines (see [`flowbench_types::markers`]).
//! Nothing else is ever written to standard output; logs and diagnostics use standard error.

use std::io::{self, Write};

use flowbench_types::BenchmarkData;

/// Writes the two marker lines, flow identifier first, and flushes the writer.
pub fn write_markers<W: Write>(out: &mut W, data: &BenchmarkData) -> io::Result<()> {
    for line in data.marker_lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
