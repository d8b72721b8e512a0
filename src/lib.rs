pub mod logger;
pub mod readout;
