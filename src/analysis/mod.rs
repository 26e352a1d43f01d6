pub mod casimir;
pub mod digital_root;
pub mod export;
pub mod geometric;
pub mod patterns;
pub mod quantization;
pub mod ratios;
