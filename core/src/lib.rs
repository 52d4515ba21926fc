extern crate self as kgi_core;

pub mod log;
