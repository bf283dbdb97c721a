pub mod address;
pub mod params;
