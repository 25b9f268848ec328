use super::Vec3;

/// A 4x4 transformation matrix stored in row-major order.
///
/// Points are column vectors, so `a.then(&b)` applies `b` first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Matrix data in row-major order: [row0, row1, row2, row3]
    pub data: [f32; 16],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, 0.0, // row 1
            0.0, 0.0, 1.0, 0.0, // row 2
            0.0, 0.0, 0.0, 1.0, // row 3
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translate3d(x: f32, y: f32, z: f32) -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, x, // row 0
                0.0, 1.0, 0.0, y, // row 1
                0.0, 0.0, 1.0, z, // row 2
                0.0, 0.0, 0.0, 1.0, // row 3
            ],
        }
    }

    pub fn scale3d(sx: f32, sy: f32, sz: f32) -> Self {
        Self {
            data: [
                sx, 0.0, 0.0, 0.0, // row 0
                0.0, sy, 0.0, 0.0, // row 1
                0.0, 0.0, sz, 0.0, // row 2
                0.0, 0.0, 0.0, 1.0, // row 3
            ],
        }
    }

    /// Rotation around the vertical axis.
    pub fn rotate_y(angle_radians: f32) -> Self {
        let cos = angle_radians.cos();
        let sin = angle_radians.sin();
        Self {
            data: [
                cos, 0.0, sin, 0.0, // row 0
                0.0, 1.0, 0.0, 0.0, // row 1
                -sin, 0.0, cos, 0.0, // row 2
                0.0, 0.0, 0.0, 1.0, // row 3
            ],
        }
    }

    /// Right-handed perspective projection into the [-1, 1] clip cube.
    ///
    /// The camera looks down -z; `w` of the result is the view-space depth.
    pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y_radians / 2.0).tan();
        let range = near - far;
        Self {
            data: [
                f / aspect, 0.0, 0.0, 0.0, // row 0
                0.0, f, 0.0, 0.0, // row 1
                0.0, 0.0, (far + near) / range, 2.0 * far * near / range, // row 2
                0.0, 0.0, -1.0, 0.0, // row 3
            ],
        }
    }

    /// Compose this transform with another: self * other
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        let a = &self.data;
        let b = &other.data;

        // Row-major indexing: element at row i, col j is at index i*4 + j
        let mut result = [0.0f32; 16];

        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[i * 4 + k] * b[k * 4 + j];
                }
                result[i * 4 + j] = sum;
            }
        }

        Transform { data: result }
    }

    /// Transform a point, dividing by the resulting `w`.
    pub fn transform_point3(&self, point: Vec3) -> Vec3 {
        let m = &self.data;
        let x = m[0] * point.x + m[1] * point.y + m[2] * point.z + m[3];
        let y = m[4] * point.x + m[5] * point.y + m[6] * point.z + m[7];
        let z = m[8] * point.x + m[9] * point.y + m[10] * point.z + m[11];
        let w = m[12] * point.x + m[13] * point.y + m[14] * point.z + m[15];
        if w.abs() < f32::EPSILON {
            return Vec3::new(x, y, z);
        }
        Vec3::new(x / w, y / w, z / w)
    }

    /// Translation column, i.e. where this transform puts the origin.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.data[3], self.data[7], self.data[11])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
