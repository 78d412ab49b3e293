pub mod histogram;
pub mod chart;
