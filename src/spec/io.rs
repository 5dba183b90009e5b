use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Id of the synthetic output pin carrying a unit's own value.
pub const SELF: &str = "self";

/// Direction of a pin, on a unit or on a graph boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Io {
    Input,
    Output,
}

impl Io {
    pub const ALL: [Io; 2] = [Io::Input, Io::Output];

    pub fn opposite(self) -> Io {
        match self {
            Io::Input => Io::Output,
            Io::Output => Io::Input,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Io::Input => "input",
            Io::Output => "output",
        }
    }
}

impl fmt::Display for Io {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pair of values, one per pin direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Default"
))]
pub struct IoOf<T> {
    #[serde(default)]
    pub input: T,
    #[serde(default)]
    pub output: T,
}

impl<T> IoOf<T> {
    pub fn new(input: T, output: T) -> Self {
        Self { input, output }
    }

    pub fn get(&self, io: Io) -> &T {
        match io {
            Io::Input => &self.input,
            Io::Output => &self.output,
        }
    }

    pub fn get_mut(&mut self, io: Io) -> &mut T {
        match io {
            Io::Input => &mut self.input,
            Io::Output => &mut self.output,
        }
    }

    /// Iterates both sides, inputs first.
    pub fn iter(&self) -> impl Iterator<Item = (Io, &T)> {
        [(Io::Input, &self.input), (Io::Output, &self.output)].into_iter()
    }
}

impl<T> Index<Io> for IoOf<T> {
    type Output = T;

    fn index(&self, io: Io) -> &T {
        self.get(io)
    }
}

impl<T> IndexMut<Io> for IoOf<T> {
    fn index_mut(&mut self, io: Io) -> &mut T {
        self.get_mut(io)
    }
}
