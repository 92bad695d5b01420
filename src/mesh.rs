// mesh.rs — 球面 / 圆柱网格生成
// 从内部观看，因此 u 方向翻转 (1 - u)，纹理水平镜像

use std::f32::consts::PI;

use crate::panorama::ProjectionMode;

pub const PANORAMA_RADIUS: f32 = 10.0;
pub const SPHERE_RINGS: usize = 150;
pub const SPHERE_SEGMENTS: usize = 300;
pub const TUBE_RADIAL_SEGMENTS: usize = 300;
pub const TUBE_HEIGHT_SEGMENTS: usize = 50;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct PanoramaMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl PanoramaMesh {
    /// Geometry for `mode`. The tube is as tall as the default vertical field
    /// of view covers at `radius`.
    pub fn for_projection(mode: ProjectionMode, radius: f32, default_fov: f32) -> Self {
        match mode {
            ProjectionMode::Spherical => build_sphere(radius, SPHERE_RINGS, SPHERE_SEGMENTS),
            ProjectionMode::Cylindrical => build_tube(
                radius,
                tube_height(radius, default_fov),
                TUBE_RADIAL_SEGMENTS,
                TUBE_HEIGHT_SEGMENTS,
            ),
        }
    }
}

pub fn tube_height(radius: f32, fov_deg: f32) -> f32 {
    (fov_deg / 2.0).to_radians().tan() * 2.0 * radius
}

// 网格索引：rows x cols 个四边形，每个拆成两个三角形
fn grid_indices(rows: usize, cols: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows * cols * 6);
    for i in 0..rows {
        for j in 0..cols {
            let a = (i * (cols + 1) + j) as u32;
            let b = a + (cols + 1) as u32;

            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    indices
}

pub fn build_sphere(radius: f32, rings: usize, segments: usize) -> PanoramaMesh {
    let mut vertices = Vec::with_capacity((rings + 1) * (segments + 1));

    for i in 0..=rings {
        let theta = PI * (i as f32) / (rings as f32);
        let y = radius * theta.cos();
        let sin_t = theta.sin();

        for j in 0..=segments {
            let phi = 2.0 * PI * (j as f32) / (segments as f32);

            vertices.push(MeshVertex {
                position: [radius * phi.cos() * sin_t, y, radius * phi.sin() * sin_t],
                uv: [1.0 - (j as f32) / (segments as f32), (i as f32) / (rings as f32)],
            });
        }
    }

    PanoramaMesh {
        vertices,
        indices: grid_indices(rings, segments),
    }
}

/// Open cylinder around the Y axis, centred on the origin.
pub fn build_tube(radius: f32, height: f32, radial_segments: usize, height_segments: usize) -> PanoramaMesh {
    let mut vertices = Vec::with_capacity((height_segments + 1) * (radial_segments + 1));

    for i in 0..=height_segments {
        let v = (i as f32) / (height_segments as f32);
        let y = height * (0.5 - v);

        for j in 0..=radial_segments {
            let phi = 2.0 * PI * (j as f32) / (radial_segments as f32);

            vertices.push(MeshVertex {
                position: [radius * phi.cos(), y, radius * phi.sin()],
                uv: [1.0 - (j as f32) / (radial_segments as f32), v],
            });
        }
    }

    PanoramaMesh {
        vertices,
        indices: grid_indices(height_segments, radial_segments),
    }
}
