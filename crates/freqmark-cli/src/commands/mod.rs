pub mod embed;
pub mod frame;
