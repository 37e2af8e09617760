use mipsim_core::common::Address;
use mipsim_core::isa::asm;

/// Builds a program image one instruction at a time.
///
/// Each line is assembled at the address it will be loaded to, so branch and
/// jump targets can be written as absolute addresses.
#[derive(Debug)]
pub struct ProgramBuilder {
    base: u64,
    words: Vec<u32>,
}

impl ProgramBuilder {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            words: Vec::new(),
        }
    }

    /// Address the next instruction will be placed at.
    pub fn next_pc(&self) -> u64 {
        self.base + (self.words.len() as u64) * 4
    }

    /// Address of the instruction at `index`.
    pub fn pc_of(&self, index: usize) -> u64 {
        self.base + (index as u64) * 4
    }

    pub fn asm(mut self, line: &str) -> Self {
        let pc = Address::new(self.next_pc());
        let word = asm::parse(line, pc).unwrap_or_else(|e| panic!("bad test asm `{line}`: {e}"));
        self.words.push(word);
        self
    }

    pub fn lines(self, lines: &[&str]) -> Self {
        lines.iter().fold(self, |b, line| b.asm(line))
    }

    pub fn word(mut self, word: u32) -> Self {
        self.words.push(word);
        self
    }

    pub fn nops(mut self, count: usize) -> Self {
        self.words.extend(std::iter::repeat_n(0, count));
        self
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Big-endian byte image.
    pub fn bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }
}
