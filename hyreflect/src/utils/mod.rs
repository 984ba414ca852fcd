pub mod conf;
pub mod error;
pub mod object;
