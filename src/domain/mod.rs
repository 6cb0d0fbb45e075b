// Domain layer: claim models and ports (interfaces).

pub mod model;
pub mod ports;
