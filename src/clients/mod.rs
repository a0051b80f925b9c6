pub mod cloud;

pub use cloud::{CloudClient, CloudConfig};
