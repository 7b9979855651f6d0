//! Parameter table: channel, UI default and the UI -> physical mapping
//! for every slider, plus the rotation dial conversion.

use std::f32::consts::TAU;

use crate::channels;

/// A slider-backed parameter.
#[derive(Debug, Clone, Copy)]
pub struct SliderParam {
    pub channel: &'static str,
    pub label: &'static str,
    /// UI value the slider starts at and publishes on construction.
    pub default: f32,
    to_physical: fn(f32) -> f32,
    /// Maps a server-pushed value back to a UI value, for parameters the
    /// server may override.
    from_inbound: Option<fn(f32) -> f32>,
}

impl SliderParam {
    pub fn to_physical(&self, ui: f32) -> f32 {
        (self.to_physical)(ui)
    }

    pub fn from_inbound(&self, value: f32) -> Option<f32> {
        self.from_inbound.map(|f| f(value))
    }

    pub fn is_server_authoritative(&self) -> bool {
        self.from_inbound.is_some()
    }
}

fn fov_degrees(ui: f32) -> f32 {
    ui * 360.0
}

fn fov_from_radians(radians: f32) -> f32 {
    radians / TAU
}

fn exposure(ui: f32) -> f32 {
    4.0 * (ui - 0.5)
}

fn gamma(ui: f32) -> f32 {
    4.0 * ui
}

fn x_pixels(ui: f32) -> f32 {
    ui * 1280.0
}

fn y_pixels(ui: f32) -> f32 {
    ui * 720.0
}

fn lambda(ui: f32) -> f32 {
    ui * 100.0
}

pub const FOV: SliderParam = SliderParam {
    channel: channels::FOV,
    label: "Field of View",
    default: 90.0 / 360.0,
    to_physical: fov_degrees,
    from_inbound: Some(fov_from_radians),
};

pub const EXPOSURE: SliderParam = SliderParam {
    channel: channels::EXPOSURE,
    label: "Exposure",
    default: 0.5,
    to_physical: exposure,
    from_inbound: None,
};

pub const GAMMA: SliderParam = SliderParam {
    channel: channels::GAMMA,
    label: "Gamma",
    default: 2.2 / 4.0,
    to_physical: gamma,
    from_inbound: None,
};

pub const X: SliderParam = SliderParam {
    channel: channels::X,
    label: "X",
    default: 640.0 / 1280.0,
    to_physical: x_pixels,
    from_inbound: None,
};

pub const Y: SliderParam = SliderParam {
    channel: channels::Y,
    label: "Y",
    default: 360.0 / 720.0,
    to_physical: y_pixels,
    from_inbound: None,
};

// The wavelength sliders start outside [0, 1] so the initial publish is 500.
pub const LAMBDA1: SliderParam = SliderParam {
    channel: channels::LAMBDA1,
    label: "Lambda1",
    default: 500.0 / 100.0,
    to_physical: lambda,
    from_inbound: None,
};

pub const LAMBDA2: SliderParam = SliderParam {
    channel: channels::LAMBDA2,
    label: "Lambda2",
    default: 500.0 / 100.0,
    to_physical: lambda,
    from_inbound: None,
};

/// Sliders in panel order.
pub static SLIDERS: [SliderParam; 7] = [FOV, EXPOSURE, GAMMA, X, Y, LAMBDA1, LAMBDA2];

/// Rotation dial value in `[0, 2π)` to degrees.
pub fn rotation_degrees(radians: f32) -> f32 {
    radians / TAU * 360.0
}

/// Wrap any angle into `[0, 2π)`.
pub fn wrap_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn linear_mappings_at_key_points() {
        let cases: [(&SliderParam, [f32; 3]); 7] = [
            (&FOV, [0.0, 180.0, 360.0]),
            (&EXPOSURE, [-2.0, 0.0, 2.0]),
            (&GAMMA, [0.0, 2.0, 4.0]),
            (&X, [0.0, 640.0, 1280.0]),
            (&Y, [0.0, 360.0, 720.0]),
            (&LAMBDA1, [0.0, 50.0, 100.0]),
            (&LAMBDA2, [0.0, 50.0, 100.0]),
        ];
        for (param, expected) in cases {
            for (ui, want) in [0.0, 0.5, 1.0].into_iter().zip(expected) {
                assert!(
                    close(param.to_physical(ui), want),
                    "{} at {ui}: {} != {want}",
                    param.channel,
                    param.to_physical(ui)
                );
            }
        }
    }

    #[test]
    fn defaults_map_to_documented_values() {
        assert!(close(FOV.to_physical(FOV.default), 90.0));
        assert!(close(EXPOSURE.to_physical(EXPOSURE.default), 0.0));
        assert!(close(GAMMA.to_physical(GAMMA.default), 2.2));
        assert!(close(X.to_physical(X.default), 640.0));
        assert!(close(Y.to_physical(Y.default), 360.0));
        assert!(close(LAMBDA1.to_physical(LAMBDA1.default), 500.0));
        assert!(close(LAMBDA2.to_physical(LAMBDA2.default), 500.0));
    }

    #[test]
    fn only_fov_accepts_server_values() {
        let authoritative: Vec<_> = SLIDERS
            .iter()
            .filter(|p| p.is_server_authoritative())
            .map(|p| p.channel)
            .collect();
        assert_eq!(authoritative, vec![channels::FOV]);
        assert!(close(FOV.from_inbound(std::f32::consts::PI).unwrap(), 0.5));
        assert!(EXPOSURE.from_inbound(1.0).is_none());
    }

    #[test]
    fn fov_inbound_inverts_outbound() {
        let radians = 90f32.to_radians();
        let ui = FOV.from_inbound(radians).unwrap();
        assert!(close(FOV.to_physical(ui), 90.0));
    }

    #[test]
    fn rotation_conversion() {
        assert!(close(rotation_degrees(0.0), 0.0));
        assert!(close(rotation_degrees(std::f32::consts::PI), 180.0));
        assert!(close(wrap_angle(-std::f32::consts::FRAC_PI_2), 1.5 * std::f32::consts::PI));
        assert!(wrap_angle(TAU) < TAU);
    }
}
