use crate::{
    common::*,
    merge::MergeOptions,
    tiling::{Tiling, TilingInit},
};

/// Tiled inference settings of one detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The input size of the network.
    pub network_size: HW<usize>,
    #[serde(default)]
    pub min_padding: usize,
    #[serde(default)]
    pub merge: MergeOptions,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = json5::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("cannot open '{}'", path.display()))?,
        )
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
        Ok(config)
    }

    /// Build the tiling of an image of the given size.
    pub fn tiling(&self, image_size: HW<usize>) -> Result<Tiling> {
        TilingInit {
            image_size,
            network_size: self.network_size,
            min_padding: self.min_padding,
        }
        .build()
    }
}
