//! Values flowing through the pipeline, from window averages to stream messages.

use serde::{Deserialize, Serialize};

/// Per-axis mean of every raw sample collected during one tick (milli-g).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowAverage {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WindowAverage {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A full run of consecutive windows, handed to the classifier as one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    windows: Vec<WindowAverage>,
}

impl Batch {
    pub fn windows(&self) -> &[WindowAverage] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl From<Vec<WindowAverage>> for Batch {
    fn from(windows: Vec<WindowAverage>) -> Self {
        Self { windows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLabel {
    Walking,
    Standing,
    Jogging,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 3] = [ClassLabel::Walking, ClassLabel::Standing, ClassLabel::Jogging];

    /// Exact (case-sensitive) match against the classifier's label strings.
    pub fn from_response(label: &str) -> Option<Self> {
        match label {
            "Walking" => Some(ClassLabel::Walking),
            "Standing" => Some(ClassLabel::Standing),
            "Jogging" => Some(ClassLabel::Jogging),
            _ => None,
        }
    }

    /// Key used on the outbound stream.
    pub const fn wire_key(self) -> &'static str {
        match self {
            ClassLabel::Walking => "walking",
            ClassLabel::Standing => "standing",
            ClassLabel::Jogging => "jogging",
        }
    }

    const fn index(self) -> usize {
        match self {
            ClassLabel::Walking => 0,
            ClassLabel::Standing => 1,
            ClassLabel::Jogging => 2,
        }
    }
}

/// Score per known class. Classes the classifier did not mention stay at 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassificationResult {
    scores: [f64; 3],
}

impl ClassificationResult {
    pub fn score(&self, label: ClassLabel) -> f64 {
        self.scores[label.index()]
    }

    pub fn set(&mut self, label: ClassLabel, score: f64) {
        self.scores[label.index()] = score;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, f64)> + '_ {
        ClassLabel::ALL.into_iter().map(|l| (l, self.score(l)))
    }

    /// Highest-scoring class; ties resolve to the earlier label.
    pub fn top(&self) -> (ClassLabel, f64) {
        self.iter()
            .fold((ClassLabel::Walking, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 { cur } else { best }
            })
    }
}

/// Wire form of one classification: `{"walking":..,"standing":..,"jogging":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamMessage {
    pub walking: f64,
    pub standing: f64,
    pub jogging: f64,
}

impl From<&ClassificationResult> for StreamMessage {
    fn from(r: &ClassificationResult) -> Self {
        Self {
            walking: r.score(ClassLabel::Walking),
            standing: r.score(ClassLabel::Standing),
            jogging: r.score(ClassLabel::Jogging),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_exactly() {
        assert_eq!(ClassLabel::from_response("Walking"), Some(ClassLabel::Walking));
        assert_eq!(ClassLabel::from_response("walking"), None);
        assert_eq!(ClassLabel::from_response("Running"), None);
    }

    #[test]
    fn message_keys_follow_wire_order() {
        let mut r = ClassificationResult::default();
        r.set(ClassLabel::Walking, 0.7);
        r.set(ClassLabel::Standing, 0.2);
        r.set(ClassLabel::Jogging, 0.1);
        let json = serde_json::to_string(&StreamMessage::from(&r)).unwrap();
        assert_eq!(json, r#"{"walking":0.7,"standing":0.2,"jogging":0.1}"#);
        for label in ClassLabel::ALL {
            assert!(json.contains(label.wire_key()));
        }
    }

    #[test]
    fn top_picks_highest_score() {
        let mut r = ClassificationResult::default();
        r.set(ClassLabel::Jogging, 0.9);
        r.set(ClassLabel::Walking, 0.1);
        assert_eq!(r.top(), (ClassLabel::Jogging, 0.9));
    }
}
