//! Room code generation.

use rand::Rng;

/// Characters a generated code is drawn from.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces candidate room codes. The registry checks uniqueness and
/// retries; a generator only has to produce plausible candidates.
pub trait CodeGenerator: Send {
    /// Returns a candidate of `length` characters.
    fn generate(&mut self, length: usize) -> String;
}

/// Uniformly random upper-case alphanumeric codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeGenerator for RandomCodes {
    fn generate(&mut self, length: usize) -> String {
        let mut rng = rand::rng();
        (0..length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Hands out a fixed list of codes in order, then repeats the last one.
///
/// Useful for forcing collisions in tests.
#[derive(Debug, Clone)]
pub struct ScriptedCodes {
    codes: Vec<String>,
    next: usize,
}

impl ScriptedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&mut self, _length: usize) -> String {
        let index = self.next.min(self.codes.len().saturating_sub(1));
        self.next += 1;
        self.codes.get(index).cloned().unwrap_or_default()
    }
}
