pub mod state;
pub mod translator;
