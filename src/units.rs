//! Length units used throughout layout. All page geometry is ultimately expressed
//! in PDF points ([Pt]); millimetres and inches convert into points.

use derive_more::{Add, AddAssign, Deref, DerefMut, Display, From, Into, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};
use std::ops::{Div, Mul, MulAssign, Neg};

/// PDF points (1/72 of an inch)
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Sum,
    Deref,
    DerefMut,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Pt(pub f32);

/// Millimetres
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, Display, From, Into)]
pub struct Mm(pub f32);

/// Inches
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, Display, From, Into)]
pub struct In(pub f32);

impl Pt {
    /// The larger of two lengths
    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    /// The smaller of two lengths
    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }

    pub fn abs(self) -> Pt {
        Pt(self.0.abs())
    }
}

impl Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl MulAssign<f32> for Pt {
    fn mul_assign(&mut self, rhs: f32) {
        self.0 *= rhs;
    }
}

impl Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// Dividing two lengths gives a plain ratio
impl Div<Pt> for Pt {
    type Output = f32;

    fn div(self, rhs: Pt) -> f32 {
        self.0 / rhs.0
    }
}

impl Neg for Pt {
    type Output = Pt;

    fn neg(self) -> Pt {
        Pt(-self.0)
    }
}

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Pt {
        Pt(mm.0 * 72.0 / 25.4)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Pt {
        Pt(inches.0 * 72.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inches_and_millimetres_convert_to_points() {
        assert_eq!(Pt::from(In(1.0)), Pt(72.0));
        assert!((*Pt::from(Mm(25.4)) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn arithmetic_keeps_units() {
        let mut y = Pt(100.0);
        y -= Pt(12.5) * 2.0;
        assert_eq!(y, Pt(75.0));
        assert_eq!(Pt(30.0) / Pt(10.0), 3.0);
        let total: Pt = [Pt(1.0), Pt(2.0), Pt(3.0)].into_iter().sum();
        assert_eq!(total, Pt(6.0));
    }
}
