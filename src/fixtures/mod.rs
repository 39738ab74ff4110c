pub mod fakes;
pub mod snapshot;
