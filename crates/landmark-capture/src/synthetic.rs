//! Synthetic faces with known geometry
//!
//! Builds a full face-mesh frame whose eye/mouth aspect ratios and head pose
//! are set directly. Used for demos, recordings and tests.

use crate::topology::{
    self, EyeLandmarks, FACE_MESH_REFINED_POINTS, LEFT_EYE, RIGHT_EYE,
};
use crate::{Landmark, LandmarkFrame};

const CENTER: (f32, f32) = (250.0, 250.0);
const EYE_Y: f32 = 200.0;
const EYE_WIDTH: f32 = 30.0;
const MOUTH_Y: f32 = 300.0;
const MOUTH_WIDTH: f32 = 60.0;
const LEFT_EYE_X: f32 = 200.0;
const RIGHT_EYE_X: f32 = 300.0;

/// Parameters of a synthetic frontal face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticFace {
    /// Lid separation as a fraction of eye width
    pub eye_opening: f32,
    /// Lip separation as a fraction of mouth width
    pub mouth_opening: f32,
    /// In-plane rotation of the whole face (degrees)
    pub roll_deg: f32,
    /// Target value of the pitch heuristic (degrees)
    pub pitch_deg: f32,
}

impl Default for SyntheticFace {
    fn default() -> Self {
        Self {
            eye_opening: 0.3,
            mouth_opening: 0.0,
            roll_deg: 0.0,
            pitch_deg: 0.0,
        }
    }
}

impl SyntheticFace {
    /// Attentive driver: eyes open, mouth closed, head level
    pub fn alert() -> Self {
        Self::default()
    }

    /// Same face with eyes shut
    pub fn eyes_closed() -> Self {
        Self {
            eye_opening: 0.05,
            ..Self::default()
        }
    }

    pub fn with_eye_opening(mut self, opening: f32) -> Self {
        self.eye_opening = opening;
        self
    }

    pub fn with_mouth_opening(mut self, opening: f32) -> Self {
        self.mouth_opening = opening;
        self
    }

    pub fn with_roll(mut self, degrees: f32) -> Self {
        self.roll_deg = degrees;
        self
    }

    pub fn with_pitch(mut self, degrees: f32) -> Self {
        self.pitch_deg = degrees;
        self
    }

    /// Render the face as a refined (478-point) landmark frame
    pub fn build(&self) -> LandmarkFrame {
        let mut frame =
            LandmarkFrame::new(vec![Landmark::new(CENTER.0, CENTER.1); FACE_MESH_REFINED_POINTS]);

        place_eye(&mut frame, &LEFT_EYE, LEFT_EYE_X, self.eye_opening);
        place_eye(&mut frame, &RIGHT_EYE, RIGHT_EYE_X, self.eye_opening);

        let half_mouth = MOUTH_WIDTH / 2.0;
        let lip_gap = self.mouth_opening * MOUTH_WIDTH / 2.0;
        frame.set(topology::MOUTH_LEFT, Landmark::new(CENTER.0 - half_mouth, MOUTH_Y));
        frame.set(topology::MOUTH_RIGHT, Landmark::new(CENTER.0 + half_mouth, MOUTH_Y));
        frame.set(topology::UPPER_LIP, Landmark::new(CENTER.0, MOUTH_Y - lip_gap));
        frame.set(topology::LOWER_LIP, Landmark::new(CENTER.0, MOUTH_Y + lip_gap));

        // pitch = (nose_to_mouth / eye_to_mouth - 1) * 50
        let face_height = MOUTH_Y - EYE_Y;
        let nose_to_mouth = face_height * (self.pitch_deg / 50.0 + 1.0);
        frame.set(topology::NOSE_TIP, Landmark::new(CENTER.0, MOUTH_Y - nose_to_mouth));

        if self.roll_deg != 0.0 {
            let (sin, cos) = self.roll_deg.to_radians().sin_cos();
            for p in frame.points.iter_mut() {
                let dx = p.x - CENTER.0;
                let dy = p.y - CENTER.1;
                p.x = CENTER.0 + dx * cos - dy * sin;
                p.y = CENTER.1 + dx * sin + dy * cos;
            }
        }

        frame
    }
}

fn place_eye(frame: &mut LandmarkFrame, eye: &EyeLandmarks, center_x: f32, opening: f32) {
    let half_width = EYE_WIDTH / 2.0;
    let half_gap = opening * EYE_WIDTH / 2.0;
    frame.set(eye.corner_a, Landmark::new(center_x - half_width, EYE_Y));
    frame.set(eye.corner_b, Landmark::new(center_x + half_width, EYE_Y));
    frame.set(eye.upper_lid, Landmark::new(center_x, EYE_Y - half_gap));
    frame.set(eye.lower_lid, Landmark::new(center_x, EYE_Y + half_gap));
}
