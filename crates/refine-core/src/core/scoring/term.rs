use std::ops::{Add, AddAssign};

/// Unweighted contributions of each score term.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreTerms {
    pub rama: f64,
    pub omega: f64,
    pub rotamer: f64,
    pub chi_pair: f64,
    pub clash: f64,
}

/// Multipliers applied to each term when forming the total score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub rama: f64,
    pub omega: f64,
    pub rotamer: f64,
    pub chi_pair: f64,
    pub clash: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rama: 1.0,
            omega: 0.5,
            rotamer: 0.5,
            chi_pair: 0.25,
            clash: 1.0,
        }
    }
}

impl ScoreTerms {
    pub const NAMES: [&'static str; 5] = ["rama", "omega", "rotamer", "chi_pair", "clash"];

    pub fn new(rama: f64, omega: f64, rotamer: f64, chi_pair: f64, clash: f64) -> Self {
        Self {
            rama,
            omega,
            rotamer,
            chi_pair,
            clash,
        }
    }

    #[inline]
    pub fn weighted_total(&self, weights: &ScoreWeights) -> f64 {
        self.rama * weights.rama
            + self.omega * weights.omega
            + self.rotamer * weights.rotamer
            + self.chi_pair * weights.chi_pair
            + self.clash * weights.clash
    }

    /// Weighted value of each term, paired with its name, in [`ScoreTerms::NAMES`] order.
    pub fn weighted(&self, weights: &ScoreWeights) -> [(&'static str, f64); 5] {
        [
            (Self::NAMES[0], self.rama * weights.rama),
            (Self::NAMES[1], self.omega * weights.omega),
            (Self::NAMES[2], self.rotamer * weights.rotamer),
            (Self::NAMES[3], self.chi_pair * weights.chi_pair),
            (Self::NAMES[4], self.clash * weights.clash),
        ]
    }
}

impl Add for ScoreTerms {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            rama: self.rama + rhs.rama,
            omega: self.omega + rhs.omega,
            rotamer: self.rotamer + rhs.rotamer,
            chi_pair: self.chi_pair + rhs.chi_pair,
            clash: self.clash + rhs.clash,
        }
    }
}

impl AddAssign for ScoreTerms {
    fn add_assign(&mut self, rhs: Self) {
        self.rama += rhs.rama;
        self.omega += rhs.omega;
        self.rotamer += rhs.rotamer;
        self.chi_pair += rhs.chi_pair;
        self.clash += rhs.clash;
    }
}
