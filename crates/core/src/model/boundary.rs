use crate::model::sequence::{CrossingKind, Sequence};

/// Place-value groups crossed when counting from one number to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundary {
    pub decade: bool,
    pub hundred: bool,
}

impl Boundary {
    #[must_use]
    pub fn crosses(self, kind: CrossingKind) -> bool {
        match kind {
            CrossingKind::Decade => self.decade,
            CrossingKind::Hundred => self.hundred,
        }
    }

    #[must_use]
    pub fn is_crossing(self) -> bool {
        self.decade || self.hundred
    }
}

/// Compare the tens and hundreds groups of `prev` and `next`.
///
/// Groups use floor division, so -1 belongs to the decade below 0.
#[must_use]
pub fn boundary_between(prev: i64, next: i64) -> Boundary {
    Boundary {
        decade: prev.div_euclid(10) != next.div_euclid(10),
        hundred: prev.div_euclid(100) != next.div_euclid(100),
    }
}

/// One tick on the hint number line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLineMarker {
    pub index: usize,
    pub value: i64,
    pub is_current: bool,
    /// Boundary relative to the previous tick. `None` on the first tick.
    pub boundary: Option<Boundary>,
}

/// Hint model showing the whole sequence with the current position and
/// crossings highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLine {
    markers: Vec<NumberLineMarker>,
}

impl NumberLine {
    #[must_use]
    pub fn new(sequence: &Sequence, current_index: usize) -> Self {
        let values = sequence.values();
        let markers = values
            .iter()
            .enumerate()
            .map(|(index, &value)| NumberLineMarker {
                index,
                value,
                is_current: index == current_index,
                boundary: index
                    .checked_sub(1)
                    .map(|prev| boundary_between(values[prev], value)),
            })
            .collect();
        Self { markers }
    }

    #[must_use]
    pub fn markers(&self) -> &[NumberLineMarker] {
        &self.markers
    }
}
