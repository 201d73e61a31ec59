pub mod signal;

pub use signal::ActivitySignal;
