pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod load;
pub mod network;
