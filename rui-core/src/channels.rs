//! Channel names shared with the render server.
//!
//! | Channel        | Direction | Payload                     |
//! |----------------|-----------|-----------------------------|
//! | env_rotation   | out       | `f32` degrees               |
//! | fov            | out / in  | `f32` degrees / radians     |
//! | exposure       | out       | `f32`                       |
//! | gamma          | out       | `f32`                       |
//! | X, Y           | out       | `f32` pixels                |
//! | lambda1/2      | out       | `f32`                       |
//! | tile_histogram | in        | `Vec<u32>`                  |
//! | device         | out       | `String`                    |
//! | load_nif       | out       | `String` remote model path  |
//! | stop           | out       | `bool`                      |
//! | hdr_header     | in        | [`HdrHeader`]               |
//! | hdr_packet     | in        | `Vec<f32>`                  |
//!
//! [`HdrHeader`]: crate::frame::HdrHeader

pub const ENV_ROTATION: &str = "env_rotation";
pub const FOV: &str = "fov";
pub const EXPOSURE: &str = "exposure";
pub const GAMMA: &str = "gamma";
pub const X: &str = "X";
pub const Y: &str = "Y";
pub const LAMBDA1: &str = "lambda1";
pub const LAMBDA2: &str = "lambda2";
pub const TILE_HISTOGRAM: &str = "tile_histogram";
pub const DEVICE: &str = "device";
pub const LOAD_NIF: &str = "load_nif";
pub const STOP: &str = "stop";
pub const HDR_HEADER: &str = "hdr_header";
pub const HDR_PACKET: &str = "hdr_packet";
