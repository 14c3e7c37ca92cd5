pub mod histogram;
pub mod hrv;
