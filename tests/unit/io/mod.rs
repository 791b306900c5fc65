mod cli;
mod error;
mod progress;
