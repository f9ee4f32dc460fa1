//! Local-offset matrix construction and spherical coordinate helpers
//!
//! All matrices are column-major `cgmath` matrices applied to column vectors,
//! which is also the layout the shaders read from the object uniform.

use std::f32::consts::PI;

use cgmath::{Matrix4, Rad, Vector3};

/// Builds `T(loc) · Rz · Ry · Rx · S(scl)`.
///
/// Rotation angles are radians about the X, Y and Z axes. The vertex is
/// scaled first, then rotated about X, Y, Z in that order, then translated.
pub fn local_offset(loc: Vector3<f32>, rot: Vector3<f32>, scl: Vector3<f32>) -> Matrix4<f32> {
    let translate = Matrix4::from_translation(loc);
    let rotate = Matrix4::from_angle_z(Rad(rot.z))
        * Matrix4::from_angle_y(Rad(rot.y))
        * Matrix4::from_angle_x(Rad(rot.x));
    let scale = Matrix4::from_nonuniform_scale(scl.x, scl.y, scl.z);
    translate * rotate * scale
}

/// Builds `T(loc) · S(scl)`, dropping the rotation.
///
/// Children of orbiting bodies compose with this so that they follow the
/// body around its orbit without inheriting its spin.
pub fn nonrotational_offset(loc: Vector3<f32>, scl: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(loc) * Matrix4::from_nonuniform_scale(scl.x, scl.y, scl.z)
}

/// World transform of a chain of local offsets, root-most first.
pub fn compose<'a, I>(offsets: I) -> Matrix4<f32>
where
    I: IntoIterator<Item = &'a Matrix4<f32>>,
{
    offsets
        .into_iter()
        .fold(<Matrix4<f32> as cgmath::SquareMatrix>::identity(), |acc, m| acc * m)
}

/// Wraps θ into [0, 2π) and φ into [0, π), keeping ρ.
pub fn clamp_angles(pol: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(pol.x, pol.y % (2.0 * PI), pol.z % PI)
}

/// Converts (ρ, θ, φ) to cartesian with Y up.
///
/// x = ρ·sinφ·cosθ, y = ρ·cosφ, z = ρ·sinφ·sinθ
pub fn spherical_to_cartesian(pol: Vector3<f32>) -> Vector3<f32> {
    let (rho, theta, phi) = (pol.x, pol.y, pol.z);
    Vector3::new(
        rho * phi.sin() * theta.cos(),
        rho * phi.cos(),
        rho * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`spherical_to_cartesian`]'s classical form: θ = atan2(y, x),
/// φ = acos(z / ρ).
pub fn cartesian_to_spherical(loc: Vector3<f32>) -> Vector3<f32> {
    let rho = (loc.x * loc.x + loc.y * loc.y + loc.z * loc.z).sqrt();
    if rho == 0.0 {
        return Vector3::new(0.0, 0.0, 0.0);
    }
    Vector3::new(rho, loc.y.atan2(loc.x), (loc.z / rho).acos())
}

/// Swaps the two components that are not `axis`.
///
/// Used to tilt a whole orbit onto another plane. Axes outside 0..=2 leave
/// the vector untouched.
pub fn swap_off_axis(mut v: Vector3<f32>, axis: Option<usize>) -> Vector3<f32> {
    if let Some(axis) = axis.filter(|a| *a <= 2) {
        let first = (axis + 1) % 3;
        let second = (axis + 2) % 3;
        let tmp = v[first];
        v[first] = v[second];
        v[second] = tmp;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, SquareMatrix, Vector4};

    fn approx_eq(a: Vector4<f32>, b: Vector4<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_local_offset_is_idempotent() {
        let loc = Vector3::new(1.5, -2.0, 3.25);
        let rot = Vector3::new(0.3, 1.1, -0.7);
        let scl = Vector3::new(2.0, 0.5, 1.0);
        let a = local_offset(loc, rot, scl);
        let b = local_offset(loc, rot, scl);
        let a_bits: Vec<u32> = AsRef::<[f32; 16]>::as_ref(&a).iter().map(|f| f.to_bits()).collect();
        let b_bits: Vec<u32> = AsRef::<[f32; 16]>::as_ref(&b).iter().map(|f| f.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_identity_inputs_give_identity() {
        let m = local_offset(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        );
        assert_eq!(m, Matrix4::identity());
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        // Scale x by 2, rotate 90° about Z, translate by (10, 0, 0).
        let m = local_offset(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, PI / 2.0),
            Vector3::new(2.0, 1.0, 1.0),
        );
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx_eq(p, Vector4::new(10.0, 2.0, 0.0, 1.0)));
    }

    #[test]
    fn test_rotation_order_is_z_y_x() {
        let rot = Vector3::new(PI / 2.0, PI / 2.0, 0.0);
        let m = local_offset(Vector3::new(0.0, 0.0, 0.0), rot, Vector3::new(1.0, 1.0, 1.0));
        // Rx maps +Y to +Z, then Ry maps +Z to +X.
        let p = m * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert!(approx_eq(p, Vector4::new(1.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_nonrotational_offset_ignores_rotation() {
        let loc = Vector3::new(1.0, 2.0, 3.0);
        let scl = Vector3::new(2.0, 2.0, 2.0);
        let m = nonrotational_offset(loc, scl);
        let with_zero_rotation = local_offset(loc, Vector3::new(0.0, 0.0, 0.0), scl);
        assert_eq!(m, with_zero_rotation);
    }

    #[test]
    fn test_compose_chain() {
        let a = local_offset(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.5, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let b = local_offset(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.1, 0.0, 0.0), Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(compose([&a, &b]), a * b);
        assert_eq!(compose(std::iter::empty::<&Matrix4<f32>>()), Matrix4::identity());
    }

    #[test]
    fn test_spherical_round_trip_on_equator() {
        let p = spherical_to_cartesian(Vector3::new(10.0, 0.0, PI / 2.0));
        assert!((p - Vector3::new(10.0, 0.0, 0.0)).magnitude() < 1e-4);
        let q = spherical_to_cartesian(Vector3::new(5.0, PI / 2.0, PI / 2.0));
        assert!((q - Vector3::new(0.0, 0.0, 5.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_cartesian_to_spherical_classical_form() {
        let up = cartesian_to_spherical(Vector3::new(0.0, 0.0, 5.0));
        assert!((up - Vector3::new(5.0, 0.0, 0.0)).magnitude() < 1e-5);

        let side = cartesian_to_spherical(Vector3::new(0.0, 3.0, 0.0));
        assert!((side - Vector3::new(3.0, PI / 2.0, PI / 2.0)).magnitude() < 1e-5);

        assert_eq!(cartesian_to_spherical(Vector3::new(0.0, 0.0, 0.0)), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_swap_off_axis() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(swap_off_axis(v, Some(0)), Vector3::new(1.0, 3.0, 2.0));
        assert_eq!(swap_off_axis(v, Some(1)), Vector3::new(3.0, 2.0, 1.0));
        assert_eq!(swap_off_axis(v, None), v);
        assert_eq!(swap_off_axis(v, Some(5)), v);
    }
}
