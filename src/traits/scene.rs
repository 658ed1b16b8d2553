use crate::types::{Indicator, IndicatorId};

/// Scene graph membership for debug indicators
pub trait SceneGraph {
    /// Insert an indicator into the scene
    fn add_indicator(&mut self, id: IndicatorId, indicator: &Indicator);

    /// Refresh transform and opacity of an indicator already in the scene
    fn update_indicator(&mut self, id: IndicatorId, indicator: &Indicator);

    /// Remove an indicator from the scene
    fn remove_indicator(&mut self, id: IndicatorId);
}
