pub mod capture;
pub mod source;
pub mod wait;
