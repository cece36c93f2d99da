pub mod evaluate;
pub mod play;
pub mod replay;
pub mod train;
pub mod visualize;

pub use evaluate::{EvaluateConfig, EvaluateMode};
pub use play::PlayMode;
pub use replay::ReplayMode;
pub use train::{TrainConfig, TrainMode};
pub use visualize::VisualizeMode;
