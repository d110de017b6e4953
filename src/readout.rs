//! Display-only diagnostics text.
//!
//! The tunnel/wave variants show live camera coordinates and the current
//! morph coefficients. Nothing consumes these strings; they exist purely for
//! on-screen display.

use crate::camera::CameraPose;
use crate::morph::{morph_params, MorphParams};

/// Camera position, one line per axis, one decimal.
pub fn camera_text(pose: &CameraPose) -> String {
    format!(
        "x: {:.1}\ny: {:.1}\nz: {:.1}",
        pose.eye.x, pose.eye.y, pose.eye.z
    )
}

/// Camera position on a single line, for window titles.
pub fn camera_line(pose: &CameraPose) -> String {
    format!(
        "x: {:.1}  y: {:.1}  z: {:.1}",
        pose.eye.x, pose.eye.y, pose.eye.z
    )
}

/// Live morph coefficients, three decimals, one per line.
pub fn morph_text(time: f32, pose: &CameraPose) -> String {
    let MorphParams { pulse_amount, height_scale, angle_offset, radius_mult } =
        morph_params(time, pose);
    format!(
        "p: {:.3}\nh: {:.3}\na: {:.3}\nr: {:.3}",
        pulse_amount, height_scale, angle_offset, radius_mult
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_camera_text_format() {
        let pose = CameraPose::new(Vec3::new(10.04, -3.26, 0.0), Vec3::ZERO, 45.0);
        assert_eq!(camera_text(&pose), "x: 10.0\ny: -3.3\nz: 0.0");
        assert_eq!(camera_line(&pose), "x: 10.0  y: -3.3  z: 0.0");
    }

    #[test]
    fn test_morph_text_has_all_params() {
        let pose = CameraPose::new(Vec3::new(13.5, 13.5, 13.5), Vec3::ZERO, 75.0);
        let text = morph_text(2.0, &pose);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("p: "));
        assert!(lines[1].starts_with("h: "));
        assert!(lines[2].starts_with("a: "));
        assert!(lines[3].starts_with("r: "));
    }
}
