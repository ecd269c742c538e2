use std::fmt;

/// Network equivalent of an expressed gene,
/// stored with the node it leaves from.
#[derive(Clone, Copy, PartialEq)]
pub(super) struct Connection {
    /// Index of the receiving node.
    pub output: usize,
    pub weight: f32,
}

impl Connection {
    pub fn new(output: usize, weight: f32) -> Connection {
        Connection { output, weight }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "->{} {:.6}", self.output, self.weight)
    }
}
