pub mod color;
pub mod customization;
pub mod kinds;
pub mod material;
pub mod observer;
pub mod region;

pub use color::*;
pub use customization::*;
pub use kinds::*;
pub use material::*;
pub use observer::*;
pub use region::*;
