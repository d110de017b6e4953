use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const fn new(pos: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position: pos, uv }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12, // [f32; 3] is 12 bytes
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    pub const fn new(pos: [f32; 3]) -> Self {
        Self { position: pos }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Unit quad in the XY plane facing +Z, UVs with V pointing down the image.
pub fn create_quad_geometry() -> (Vec<Vertex>, Vec<u16>) {
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], [0.0, 1.0]),
        Vertex::new([0.5, -0.5, 0.0], [1.0, 1.0]),
        Vertex::new([0.5, 0.5, 0.0], [1.0, 0.0]),
        Vertex::new([-0.5, 0.5, 0.0], [0.0, 0.0]),
    ];
    let indices = vec![0, 1, 2, 2, 3, 0];
    (vertices, indices)
}

fn push_segment(out: &mut Vec<LineVertex>, a: [f32; 3], b: [f32; 3]) {
    out.push(LineVertex::new(a));
    out.push(LineVertex::new(b));
}

/// Latitude/longitude wireframe of a sphere, as a line list.
pub fn sphere_wireframe(radius: f32, rings: u32, segments: u32) -> Vec<LineVertex> {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut lines = Vec::new();
    let point = |ring: u32, seg: u32| -> [f32; 3] {
        let phi = ring as f32 / rings as f32 * PI;
        let theta = seg as f32 / segments as f32 * PI * 2.0;
        [
            radius * theta.cos() * phi.sin(),
            radius * phi.cos(),
            radius * theta.sin() * phi.sin(),
        ]
    };
    for ring in 1..rings {
        for seg in 0..segments {
            push_segment(&mut lines, point(ring, seg), point(ring, seg + 1));
        }
    }
    for seg in 0..segments {
        for ring in 0..rings {
            push_segment(&mut lines, point(ring, seg), point(ring + 1, seg));
        }
    }
    lines
}

/// Flat square grid in the XZ plane, `divisions` cells per side.
pub fn grid_lines(extent: f32, divisions: u32) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let half = extent / 2.0;
    let mut lines = Vec::new();
    for i in 0..=divisions {
        let t = -half + extent * i as f32 / divisions as f32;
        push_segment(&mut lines, [t, 0.0, -half], [t, 0.0, half]);
        push_segment(&mut lines, [-half, 0.0, t], [half, 0.0, t]);
    }
    lines
}

/// Rectangle outline in the XY plane, used for the highlight border.
pub fn rect_outline(width: f32, height: f32) -> Vec<LineVertex> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let corners = [
        [-hw, -hh, 0.0],
        [hw, -hh, 0.0],
        [hw, hh, 0.0],
        [-hw, hh, 0.0],
    ];
    let mut lines = Vec::new();
    for i in 0..4 {
        push_segment(&mut lines, corners[i], corners[(i + 1) % 4]);
    }
    lines
}

/// Rectangle outline lying flat in the XZ plane (the wave field boundary).
pub fn flat_rect_outline(width: f32, depth: f32) -> Vec<LineVertex> {
    rect_outline(width, depth)
        .into_iter()
        .map(|v| {
            // Rotate -90 deg around X: (x, y, 0) -> (x, 0, -y)
            LineVertex::new([v.position[0], 0.0, -v.position[1]])
        })
        .collect()
}

/// X/Y/Z axis guide lines from the origin.
pub fn axis_lines(length: f32) -> [Vec<LineVertex>; 3] {
    [
        vec![LineVertex::new([0.0; 3]), LineVertex::new([length, 0.0, 0.0])],
        vec![LineVertex::new([0.0; 3]), LineVertex::new([0.0, length, 0.0])],
        vec![LineVertex::new([0.0; 3]), LineVertex::new([0.0, 0.0, length])],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_geometry() {
        let (vertices, indices) = create_quad_geometry();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        for v in &vertices {
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn test_sphere_wireframe_on_radius() {
        let lines = sphere_wireframe(3.0, 8, 12);
        assert!(!lines.is_empty());
        assert_eq!(lines.len() % 2, 0);
        for v in &lines {
            let [x, y, z] = v.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!((r - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_grid_line_count() {
        let lines = grid_lines(10.0, 4);
        // (divisions + 1) lines in each direction, 2 vertices per line.
        assert_eq!(lines.len(), (4 + 1) * 2 * 2);
    }

    #[test]
    fn test_rect_outline_closed() {
        let lines = rect_outline(2.0, 1.0);
        assert_eq!(lines.len(), 8);
    }
}
