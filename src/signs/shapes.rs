//! Finger-state hand model used to generate the built-in reference poses.
//!
//! Each finger is a chain of three bones rooted at a fixed knuckle. Flexion
//! rotates the chain out of the image plane toward the camera, so a curled
//! finger projects back over the palm and gains negative depth.

use crate::constants::LANDMARK_COUNT;
use crate::signs::types::{Finger, HandPose, Landmark, WRIST};

const WRIST_POS: (f64, f64) = (0.5, 0.92);
/// Model-space to frame scale; a hand spans roughly 40% of frame height.
const HAND_SCALE: f64 = 1.8;

/// Flexion per joint (radians) for the three joints of a finger chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curl {
    Straight,
    Hooked,
    Curled,
}

impl Curl {
    fn flexion(self) -> [f64; 3] {
        match self {
            Curl::Straight => [0.0, 0.0, 0.0],
            Curl::Hooked => [0.5, 0.5, 0.4],
            Curl::Curled => [1.5, 1.4, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbPose {
    /// Pointing away from the palm, as in "L".
    Out,
    /// Pressed alongside the index finger, as in "A".
    Up,
    /// Folded across the palm.
    Across,
    /// Arched, as in "C".
    Curved,
}

impl ThumbPose {
    fn direction_deg(self) -> f64 {
        match self {
            ThumbPose::Out => -150.0,
            ThumbPose::Up => -105.0,
            ThumbPose::Across => -20.0,
            ThumbPose::Curved => -135.0,
        }
    }

    fn flexion(self) -> [f64; 3] {
        match self {
            ThumbPose::Out | ThumbPose::Up => [0.0, 0.0, 0.0],
            ThumbPose::Across => [0.3, 0.3, 0.2],
            ThumbPose::Curved => [0.4, 0.4, 0.4],
        }
    }
}

struct Chain {
    /// Knuckle offset from the wrist, in model space.
    base: (f64, f64),
    direction_deg: f64,
    bones: [f64; 3],
}

fn finger_chain(finger: Finger, spread: f64) -> Chain {
    let (base, direction_deg, bones) = match finger {
        Finger::Thumb => ((-0.05, -0.05), -150.0, [0.05, 0.045, 0.035]),
        Finger::Index => ((-0.07, -0.23), -100.0, [0.075, 0.045, 0.035]),
        Finger::Middle => ((-0.02, -0.25), -92.0, [0.08, 0.05, 0.038]),
        Finger::Ring => ((0.03, -0.24), -84.0, [0.075, 0.045, 0.035]),
        Finger::Pinky => ((0.075, -0.205), -76.0, [0.06, 0.035, 0.03]),
    };
    Chain {
        base,
        direction_deg: -90.0 + (direction_deg + 90.0) * spread,
        bones,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandShape {
    pub thumb: ThumbPose,
    pub index: Curl,
    pub middle: Curl,
    pub ring: Curl,
    pub pinky: Curl,
    /// Multiplier on the natural angle between fingers; 1.0 is relaxed.
    pub spread: f64,
}

impl HandShape {
    pub fn fist(thumb: ThumbPose) -> Self {
        Self {
            thumb,
            index: Curl::Curled,
            middle: Curl::Curled,
            ring: Curl::Curled,
            pinky: Curl::Curled,
            spread: 1.0,
        }
    }

    pub fn open(thumb: ThumbPose) -> Self {
        Self {
            thumb,
            index: Curl::Straight,
            middle: Curl::Straight,
            ring: Curl::Straight,
            pinky: Curl::Straight,
            spread: 1.0,
        }
    }

    /// The thumb is shaped by `ThumbPose`; a curl passed for it is ignored.
    pub fn with(mut self, finger: Finger, curl: Curl) -> Self {
        match finger {
            Finger::Thumb => {}
            Finger::Index => self.index = curl,
            Finger::Middle => self.middle = curl,
            Finger::Ring => self.ring = curl,
            Finger::Pinky => self.pinky = curl,
        }
        self
    }

    pub fn spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    fn curl_of(&self, finger: Finger) -> Curl {
        match finger {
            Finger::Thumb => Curl::Straight,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    pub fn build(&self) -> HandPose {
        let mut landmarks = [Landmark {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            v: 1.0,
        }; LANDMARK_COUNT];

        landmarks[WRIST].x = WRIST_POS.0;
        landmarks[WRIST].y = WRIST_POS.1;

        for finger in Finger::ALL {
            let mut chain = finger_chain(finger, self.spread);
            let flexion = if finger == Finger::Thumb {
                chain.direction_deg = self.thumb.direction_deg();
                self.thumb.flexion()
            } else {
                self.curl_of(finger).flexion()
            };

            let joints = finger.joints();
            let (dir_x, dir_y) = {
                let rad = chain.direction_deg.to_radians();
                (rad.cos(), rad.sin())
            };

            let mut pos = (chain.base.0, chain.base.1, -0.01);
            landmarks[joints[0]] = to_frame(pos);

            let mut theta = 0.0;
            for (k, &len) in chain.bones.iter().enumerate() {
                theta += flexion[k];
                let along = len * theta.cos();
                pos.0 += along * dir_x;
                pos.1 += along * dir_y;
                pos.2 -= len * theta.sin();
                landmarks[joints[k + 1]] = to_frame(pos);
            }
        }

        HandPose::from_landmarks(landmarks)
    }
}

fn to_frame((x, y, z): (f64, f64, f64)) -> Landmark {
    Landmark {
        x: WRIST_POS.0 + HAND_SCALE * x,
        y: WRIST_POS.1 + HAND_SCALE * y,
        z: HAND_SCALE * z,
        v: 1.0,
    }
}
