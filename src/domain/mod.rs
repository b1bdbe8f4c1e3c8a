// Domain layer: records, request shapes and the ports (interfaces) the services talk through.

pub mod model;
pub mod ports;
