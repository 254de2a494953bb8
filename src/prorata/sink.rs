use anyhow::Result;

use super::OutputFeature;

/// Append-only destination for output features.
pub trait FeatureSink {
    fn add_feature(&mut self, feature: OutputFeature) -> Result<()>;
}

/// Collect output in memory.
impl FeatureSink for Vec<OutputFeature> {
    fn add_feature(&mut self, feature: OutputFeature) -> Result<()> {
        self.push(feature);
        Ok(())
    }
}
