// Domain layer: checkout models and ports (interfaces) for the UI binding and fragment IO.

pub mod model;
pub mod ports;
