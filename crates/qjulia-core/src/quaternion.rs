//! Quaternion arithmetic for the iterated dynamical system.
//!
//! Unlike a rotation quaternion, this type is a point in R⁴: the sample
//! position of the Julia iteration. The scalar (real) axis is `x`, the
//! vector axes are `(y, z, w)`; the Hamilton product and the analytic
//! transcendental lifts below all follow that convention.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// A quaternion `(x, y, z, w)` with `x` as the real axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// Creates a quaternion from its four components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// The zero quaternion.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Lifts a real number onto the real axis.
    #[must_use]
    pub const fn from_real(value: f32) -> Self {
        Self::new(value, 0.0, 0.0, 0.0)
    }

    /// Squared norm `x² + y² + z² + w²`.
    #[must_use]
    pub fn norm_sqr(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Conjugate: the vector part negated.
    #[must_use]
    pub fn conjugate(self) -> Self {
        Self::new(self.x, -self.y, -self.z, -self.w)
    }

    /// Magnitude of the vector part `(y, z, w)`.
    fn vector_norm(self) -> f32 {
        (self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Rebuilds a quaternion from a real part and a scaled copy of this
    /// quaternion's vector part.
    fn with_vector_scaled(self, real: f32, scale: f32) -> Self {
        Self::new(real, self.y * scale, self.z * scale, self.w * scale)
    }

    /// Multiplicative inverse `conj(q) / |q|²`.
    ///
    /// A zero-norm quaternion yields non-finite components; callers that
    /// must fail explicitly check `norm_sqr` first (see the equation
    /// evaluator's division handling).
    #[must_use]
    pub fn reciprocal(self) -> Self {
        let n = self.norm_sqr();
        let c = self.conjugate();
        Self::new(c.x / n, c.y / n, c.z / n, c.w / n)
    }

    /// Quaternion sine: `sin(a)cosh(m) + v̂ cos(a)sinh(m)` for `q = a + v`,
    /// `m = |v|`.
    #[must_use]
    pub fn sin(self) -> Self {
        let m = self.vector_norm();
        if m == 0.0 {
            return Self::from_real(self.x.sin());
        }
        self.with_vector_scaled(self.x.sin() * m.cosh(), self.x.cos() * m.sinh() / m)
    }

    /// Quaternion cosine: `cos(a)cosh(m) - v̂ sin(a)sinh(m)`.
    #[must_use]
    pub fn cos(self) -> Self {
        let m = self.vector_norm();
        if m == 0.0 {
            return Self::from_real(self.x.cos());
        }
        self.with_vector_scaled(self.x.cos() * m.cosh(), -self.x.sin() * m.sinh() / m)
    }

    /// Quaternion tangent `sin(q) · cos(q)⁻¹`.
    ///
    /// Near the poles of the real tangent the reciprocal degrades to
    /// non-finite components, which the escape test classifies as outside.
    #[must_use]
    pub fn tan(self) -> Self {
        self.sin() * self.cos().reciprocal()
    }

    /// Quaternion hyperbolic sine: `sinh(a)cos(m) + v̂ cosh(a)sin(m)`.
    #[must_use]
    pub fn sinh(self) -> Self {
        let m = self.vector_norm();
        if m == 0.0 {
            return Self::from_real(self.x.sinh());
        }
        self.with_vector_scaled(self.x.sinh() * m.cos(), self.x.cosh() * m.sin() / m)
    }

    /// Quaternion hyperbolic cosine: `cosh(a)cos(m) + v̂ sinh(a)sin(m)`.
    #[must_use]
    pub fn cosh(self) -> Self {
        let m = self.vector_norm();
        if m == 0.0 {
            return Self::from_real(self.x.cosh());
        }
        self.with_vector_scaled(self.x.cosh() * m.cos(), self.x.sinh() * m.sin() / m)
    }

    /// Quaternion hyperbolic tangent `sinh(q) · cosh(q)⁻¹`.
    #[must_use]
    pub fn tanh(self) -> Self {
        self.sinh() * self.cosh().reciprocal()
    }

    /// Quaternion exponential: `e^a (cos(m) + v̂ sin(m))`.
    #[must_use]
    pub fn exp(self) -> Self {
        let m = self.vector_norm();
        let ea = self.x.exp();
        if m == 0.0 {
            return Self::from_real(ea);
        }
        self.with_vector_scaled(ea * m.cos(), ea * m.sin() / m)
    }

    /// Principal quaternion logarithm: `ln|q| + v̂ acos(a / |q|)`.
    ///
    /// Degenerates to the real logarithm on the real axis; out-of-domain
    /// inputs propagate NaN, which the escape test classifies as outside.
    #[must_use]
    pub fn log(self) -> Self {
        let m = self.vector_norm();
        let norm = self.norm_sqr().sqrt();
        if m == 0.0 {
            return Self::from_real(self.x.ln());
        }
        self.with_vector_scaled(norm.ln(), (self.x / norm).acos() / m)
    }

    /// Principal quaternion square root via the polar form
    /// `√|q| (cos(θ/2) + v̂ sin(θ/2))`, `θ = acos(a / |q|)`.
    #[must_use]
    pub fn sqrt(self) -> Self {
        let m = self.vector_norm();
        if m == 0.0 {
            return Self::from_real(self.x.sqrt());
        }
        let norm = self.norm_sqr().sqrt();
        let theta = (self.x / norm).acos();
        let root = norm.sqrt();
        self.with_vector_scaled(root * (theta * 0.5).cos(), root * (theta * 0.5).sin() / m)
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Sub for Quaternion {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product with `x` as the scalar part:
    /// `(s₁s₂ − v₁·v₂, s₁v₂ + s₂v₁ + v₁×v₂)`.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.x * rhs.x - self.y * rhs.y - self.z * rhs.z - self.w * rhs.w,
            self.x * rhs.y + self.y * rhs.x + self.z * rhs.w - self.w * rhs.z,
            self.x * rhs.z - self.y * rhs.w + self.z * rhs.x + self.w * rhs.y,
            self.x * rhs.w + self.y * rhs.z - self.z * rhs.y + self.w * rhs.x,
        )
    }
}

impl Div for Quaternion {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self * rhs.reciprocal()
    }
}
