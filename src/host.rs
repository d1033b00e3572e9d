//! Collaborator interfaces the execution core calls out through but
//! never implements. A host binary supplies concrete adapters; this
//! core ships only trivial fakes for its own tests.

/// Text output sink, reached by `print`/`print_ret` and friends. This
/// core decodes neither ZSCII nor the abbreviation table (out of
/// scope); a host is expected to do that before or instead of calling
/// through this trait for the opcodes this core implements.
pub trait TextOutput {
    fn write_str(&mut self, text: &str);
}

/// Line/character input, reached by `sread`/`read_char`. Out of scope
/// for the opcodes this core dispatches, but declared so a host fetch
/// loop built on this crate has a stable seam to implement against.
pub trait TextInput {
    fn read_line(&mut self, buffer: &mut String) -> bool;
}

/// Random number source for `random`. This core does not implement the
/// `random` opcode itself, but the trait is part of the external
/// interface surface a host composes this crate with.
pub trait Rng {
    fn next_in_range(&mut self, range: i16) -> i16;
}

pub trait SaveState {
    fn save(&mut self, data: &[u8]) -> bool;
}

pub trait RestoreState {
    fn restore(&mut self) -> Option<Vec<u8>>;
}

/// Version-gated screen-model operations (`split_window`, `set_window`,
/// and friends). Declared as a trait rather than implemented: display
/// is explicitly out of scope for this core.
pub trait WindowOps {
    fn split_window(&mut self, lines: u16);
    fn set_window(&mut self, window: u16);
}

#[cfg(test)]
pub(crate) mod test_fakes {
    use super::TextOutput;

    #[derive(Default)]
    pub struct RecordingOutput {
        pub buffer: String,
    }

    impl TextOutput for RecordingOutput {
        fn write_str(&mut self, text: &str) {
            self.buffer.push_str(text);
        }
    }
}
