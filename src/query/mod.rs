pub mod cycles;
pub mod output;
