//! Face Mesh landmark indices used by the fatigue features

/// Landmarks with refined iris points
pub const FACE_MESH_REFINED_POINTS: usize = 478;

pub const NOSE_TIP: usize = 1;

/// Lid and corner landmarks of one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLandmarks {
    pub upper_lid: usize,
    pub lower_lid: usize,
    /// Corner closer to the image left edge
    pub corner_a: usize,
    pub corner_b: usize,
}

pub const LEFT_EYE: EyeLandmarks = EyeLandmarks {
    upper_lid: 160,
    lower_lid: 144,
    corner_a: 33,
    corner_b: 133,
};

pub const RIGHT_EYE: EyeLandmarks = EyeLandmarks {
    upper_lid: 385,
    lower_lid: 380,
    corner_a: 362,
    corner_b: 263,
};

pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;
pub const MOUTH_LEFT: usize = 78;
pub const MOUTH_RIGHT: usize = 308;

/// Outer eye corners defining the eye line for roll
pub const EYE_LINE_LEFT: usize = 33;
pub const EYE_LINE_RIGHT: usize = 263;
