pub mod render;
pub mod scenario;

pub use render::{render_feature, scenario_steps};
pub use scenario::ScenarioRecord;
