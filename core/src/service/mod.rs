pub mod chart;
pub mod chart_image;
pub mod journal;
pub mod store;
