pub mod config;
pub mod frame;
pub mod inspect;
pub mod listen;
pub mod send;
