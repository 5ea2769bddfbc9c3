//! Architectural Register Snapshot.
//!
//! This module holds the register state a core exposes to the driver. It provides:
//! 1. **Storage:** 32 general-purpose registers, eight condition register fields, LR and CTR.
//! 2. **Packing:** The 32-bit condition register word built from its fields.
//! 3. **Dump:** The fixed-format text emitted once by the termination protocol.

use std::fmt;
use std::io::{self, Write};

use crate::common::constants::{CR_FIELD_MASK, CR_FIELDS, GPR_COUNT};

/// Snapshot of the architectural registers of a core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchState {
    /// General-purpose registers `r0`..`r31`.
    pub gpr: [u64; GPR_COUNT],
    /// Condition register fields `CR0`..`CR7`, four bits each (LT, GT, EQ, SO).
    pub cr: [u8; CR_FIELDS],
    /// Link register.
    pub lr: u64,
    /// Count register.
    pub ctr: u64,
}

impl Default for ArchState {
    fn default() -> Self {
        Self {
            gpr: [0; GPR_COUNT],
            cr: [0; CR_FIELDS],
            lr: 0,
            ctr: 0,
        }
    }
}

impl ArchState {
    /// Packs the condition register fields into the 32-bit CR word, `CR0` in the top nibble.
    pub fn cr_word(&self) -> u32 {
        self.cr
            .iter()
            .fold(0u32, |word, field| (word << 4) | u32::from(field & CR_FIELD_MASK))
    }

    /// Writes the register dump to `out`.
    ///
    /// The dump is 35 lines: `GPR0`..`GPR31`, `CR`, `LR` and `CTR`, each value in
    /// uppercase zero-padded hexadecimal.
    pub fn write_dump<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")?;
        out.flush()
    }
}

impl fmt::Display for ArchState {
    /// Formats the register dump, one register per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.gpr.iter().enumerate() {
            writeln!(f, "GPR{i} {value:016X}")?;
        }
        write!(f, "CR 00000000")?;
        for field in &self.cr {
            write!(f, "{:01X}", field & CR_FIELD_MASK)?;
        }
        writeln!(f)?;
        writeln!(f, "LR {:016X}", self.lr)?;
        writeln!(f, "CTR {:016X}", self.ctr)
    }
}
