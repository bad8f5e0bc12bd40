pub use anyhow::{ensure, Context as _, Result};
pub use bbox::{Rect, RectNum, HW, TLBR};
pub use getset::CopyGetters;
pub use itertools::Itertools as _;
pub use label::{Label, TileLabel};
pub use log::{debug, trace};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{cmp::Reverse, fs, path::Path};
