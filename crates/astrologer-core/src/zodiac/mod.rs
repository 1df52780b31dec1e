pub mod ayanamsha;
pub mod frame;

pub use ayanamsha::{AyanamshaModel, AyanamshaTable, SiderealMode};
pub use frame::{ZodiacFrame, ZodiacType};
