// Core modules implementing scanning, restoration, serialization, and error modeling.
pub mod compile;
pub mod emit;
pub mod error;
pub mod restore;
pub mod scan;
pub mod value;
