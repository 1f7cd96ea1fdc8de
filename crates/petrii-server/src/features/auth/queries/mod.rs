pub mod me;

pub use me::MeError;
