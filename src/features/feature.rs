//! Match-up features and their two visions
//!
//! A feature is computed once for a match-up team_1 vs. team_2 and can then be
//! read from either team's side. `vision_1` is the team_1 perspective,
//! `vision_2` the team_2 perspective, so that for every feature
//! `f(a, b).vision_2() == f(b, a).vision_1()`.

/// A named statistic computed for a match-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feature {
    /// Intrinsic to each team and unrelated to the opponent (seed, averages, ...)
    Absolute { value_1: f64, value_2: f64 },
    /// Tied to the pairing itself, one value per perspective
    Relative { value_1: f64, value_2: f64 },
}

impl Feature {
    pub fn absolute(value_1: f64, value_2: f64) -> Self {
        Feature::Absolute { value_1, value_2 }
    }

    /// Signed difference team_1 - team_2, read as team_2 - team_1 from the other side
    pub fn between(value_1: f64, value_2: f64) -> Self {
        Feature::Relative {
            value_1: value_1 - value_2,
            value_2: value_2 - value_1,
        }
    }

    /// Relative signal that reads the same from both sides
    pub fn symmetric(value: f64) -> Self {
        Feature::Relative {
            value_1: value,
            value_2: value,
        }
    }

    /// Number of values in one vision
    pub fn width(&self) -> usize {
        match self {
            Feature::Absolute { .. } => 2,
            Feature::Relative { .. } => 1,
        }
    }

    pub fn vision_1(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        self.extend_vision_1(&mut out);
        out
    }

    pub fn vision_2(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        self.extend_vision_2(&mut out);
        out
    }

    pub fn extend_vision_1(&self, out: &mut Vec<f64>) {
        match *self {
            Feature::Absolute { value_1, value_2 } => out.extend([value_1, value_2]),
            Feature::Relative { value_1, .. } => out.push(value_1),
        }
    }

    pub fn extend_vision_2(&self, out: &mut Vec<f64>) {
        match *self {
            Feature::Absolute { value_1, value_2 } => out.extend([value_2, value_1]),
            Feature::Relative { value_2, .. } => out.push(value_2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_visions() {
        let f = Feature::absolute(3.0, 11.0);
        assert_eq!(f.vision_1(), vec![3.0, 11.0]);
        assert_eq!(f.vision_2(), vec![11.0, 3.0]);
        assert_eq!(f.width(), 2);
    }

    #[test]
    fn test_difference_visions() {
        let f = Feature::between(3.0, 11.0);
        assert_eq!(f.vision_1(), vec![-8.0]);
        assert_eq!(f.vision_2(), vec![8.0]);
    }

    #[test]
    fn test_swap_invariant() {
        let (a, b) = (4.5, 1.25);
        assert_eq!(
            Feature::absolute(a, b).vision_2(),
            Feature::absolute(b, a).vision_1()
        );
        assert_eq!(
            Feature::between(a, b).vision_2(),
            Feature::between(b, a).vision_1()
        );
        assert_eq!(Feature::symmetric(2.0).vision_2(), Feature::symmetric(2.0).vision_1());
    }
}
