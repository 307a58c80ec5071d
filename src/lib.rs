pub mod artifacts;
pub mod dataset;
pub mod export;
pub mod features;
pub mod gbm;
pub mod risk;
pub mod roster;
pub mod state;
pub mod trainer;
pub mod trend;
