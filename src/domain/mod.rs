// Domain layer: core models and ports (interfaces). Concrete browser and chat
// integrations live under adapters.

pub mod model;
pub mod ports;
