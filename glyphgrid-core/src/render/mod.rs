pub mod cache;
pub mod frame;
pub mod raster;
