mod params;

pub use params::{Params, bind};
