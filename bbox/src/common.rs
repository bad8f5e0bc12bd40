pub use anyhow::{ensure, Result};
pub use num_traits::{Num, NumCast, ToPrimitive, Zero};
pub use std::ops::Mul;

#[cfg(feature = "serde")]
pub use serde::{Deserialize, Serialize};
