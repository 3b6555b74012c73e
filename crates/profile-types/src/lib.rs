pub mod dimensions;
pub mod face;
pub mod family;
pub mod feature;
pub mod report;

pub use dimensions::*;
pub use face::*;
pub use family::*;
pub use feature::*;
pub use report::*;
