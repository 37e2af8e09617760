
/// Encode, decode, disassemble and parse agree with each other.
pub mod round_trip;
