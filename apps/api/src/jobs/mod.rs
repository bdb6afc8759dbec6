pub mod assembler;
pub mod handlers;
pub mod models;
pub mod scoring;
