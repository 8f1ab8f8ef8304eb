// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose landmark schema: body parts, keypoints, and whole poses.
//!
//! The schema is the 17-keypoint single-person layout produced by MoveNet
//! models. The enumeration order is fixed and matches the model's output
//! channel order; CSV columns are derived from it.

/// Named body parts in the model's fixed output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    /// Number of tracked body parts.
    pub const COUNT: usize = 17;

    /// All body parts in model output order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Returns the uppercase name used in combined-table column headers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "NOSE",
            Self::LeftEye => "LEFT_EYE",
            Self::RightEye => "RIGHT_EYE",
            Self::LeftEar => "LEFT_EAR",
            Self::RightEar => "RIGHT_EAR",
            Self::LeftShoulder => "LEFT_SHOULDER",
            Self::RightShoulder => "RIGHT_SHOULDER",
            Self::LeftElbow => "LEFT_ELBOW",
            Self::RightElbow => "RIGHT_ELBOW",
            Self::LeftWrist => "LEFT_WRIST",
            Self::RightWrist => "RIGHT_WRIST",
            Self::LeftHip => "LEFT_HIP",
            Self::RightHip => "RIGHT_HIP",
            Self::LeftKnee => "LEFT_KNEE",
            Self::RightKnee => "RIGHT_KNEE",
            Self::LeftAnkle => "LEFT_ANKLE",
            Self::RightAnkle => "RIGHT_ANKLE",
        }
    }
}

/// A single detected landmark.
///
/// Coordinates are in pixel space of the 256x256 network input frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// X coordinate in pixels.
    pub x: f32,
    /// Y coordinate in pixels.
    pub y: f32,
    /// Confidence score in [0, 1].
    pub score: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub const fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }
}

/// One detection result: a fixed array of keypoints, one per body part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Keypoints indexed by [`BodyPart`] order.
    pub keypoints: [Keypoint; BodyPart::COUNT],
}

impl Pose {
    /// Create a pose from a full keypoint array.
    #[must_use]
    pub const fn new(keypoints: [Keypoint; BodyPart::COUNT]) -> Self {
        Self { keypoints }
    }

    /// Minimum confidence score across all keypoints.
    ///
    /// Used as the keep/skip criterion: a pose is only trusted when even
    /// its worst landmark clears the detection threshold.
    #[must_use]
    pub fn min_score(&self) -> f32 {
        self.keypoints
            .iter()
            .map(|kp| kp.score)
            .fold(f32::INFINITY, f32::min)
    }

    /// Flatten to `(x, y, score)` triples in body-part order.
    #[must_use]
    pub fn flatten(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(BodyPart::COUNT * 3);
        for kp in &self.keypoints {
            values.push(kp.x);
            values.push(kp.y);
            values.push(kp.score);
        }
        values
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new([Keypoint::default(); BodyPart::COUNT])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_part_order() {
        assert_eq!(BodyPart::ALL[0], BodyPart::Nose);
        assert_eq!(BodyPart::ALL[16], BodyPart::RightAnkle);
        assert_eq!(BodyPart::ALL.len(), BodyPart::COUNT);
        for (i, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(*part as usize, i);
        }
    }

    #[test]
    fn test_body_part_names() {
        assert_eq!(BodyPart::Nose.as_str(), "NOSE");
        assert_eq!(BodyPart::LeftShoulder.as_str(), "LEFT_SHOULDER");
        assert_eq!(BodyPart::RightAnkle.as_str(), "RIGHT_ANKLE");
    }

    #[test]
    fn test_min_score() {
        let mut keypoints = [Keypoint::new(0.0, 0.0, 0.9); BodyPart::COUNT];
        keypoints[BodyPart::LeftWrist as usize] = Keypoint::new(10.0, 20.0, 0.05);
        let pose = Pose::new(keypoints);
        assert!((pose.min_score() - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn test_flatten_layout() {
        let mut keypoints = [Keypoint::default(); BodyPart::COUNT];
        keypoints[0] = Keypoint::new(1.0, 2.0, 0.5);
        let pose = Pose::new(keypoints);
        let flat = pose.flatten();
        assert_eq!(flat.len(), BodyPart::COUNT * 3);
        assert_eq!(&flat[0..3], &[1.0, 2.0, 0.5]);
    }
}
