mod common;
mod scoring;
mod sweep;
