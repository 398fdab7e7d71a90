mod common;
mod history;
mod trbs;
