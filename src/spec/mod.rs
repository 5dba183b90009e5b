pub mod io;
pub mod merge;
pub mod pin;
pub mod plug;
pub mod unit;

pub use io::*;
pub use merge::*;
pub use pin::*;
pub use plug::*;
pub use unit::*;
