pub mod extractors;
pub mod flash;
pub mod jwt;
pub mod views;
