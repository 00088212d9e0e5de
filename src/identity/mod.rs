pub mod signature;

pub use signature::{Signature, make_signature, steps_signature};
