//! The five MIPS pipeline stages.
//!
//! Each stage reads the latch in front of it and writes the latch behind it; the
//! core calls them back to front so every latch is consumed before it is refilled.
//! 1. **Fetch (IF):** Reads the word at the PC through the program cache and picks the next PC.
//! 2. **Decode (ID):** Builds control signals, reads operands and checks hazards.
//! 3. **Execute (EX):** Runs the ALU, applies forwarding and resolves jumps and branches.
//! 4. **Memory (MEM):** Performs data accesses and commits exceptions and interrupts.
//! 5. **Writeback (WB):** Writes the register file and retires the instruction.

/// ID: control signals and operand read.
pub mod decode;

/// EX: ALU and branch resolution.
pub mod execute;

/// IF: instruction fetch and next-PC selection.
pub mod fetch;

/// MEM: data access and exception commit.
pub mod memory;

/// WB: register write and retirement.
pub mod writeback;

pub use decode::decode_stage;
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use memory::mem_stage;
pub use writeback::wb_stage;
