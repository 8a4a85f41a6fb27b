pub mod promotion;
pub mod ranking;
