// Domain layer: catalog models, the analysis report and the ports the pipeline is written against.

pub mod model;
pub mod ports;
