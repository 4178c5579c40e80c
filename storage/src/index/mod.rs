pub mod ann;

pub use ann::{IndexError, LinearAnnIndex};
