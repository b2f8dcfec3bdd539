pub mod build;
pub mod capture;
pub mod measure;
pub mod sweep;
