use serde_json::{json, Value};

use signcoach_backend::signs::templates::TemplateRegistry;

/// Reference landmarks for `sign`, optionally shifted and with explicit visibility.
pub fn sign_landmarks(sign: &str, dx: f64, dy: f64, visibility: Option<f64>) -> Vec<Value> {
    let registry = TemplateRegistry::builtin();
    let pose = registry.get(sign).expect("builtin sign").pose.translated(dx, dy, 0.0);
    pose.landmarks()
        .iter()
        .map(|lm| match visibility {
            Some(v) => json!({ "x": lm.x, "y": lm.y, "z": lm.z, "v": v }),
            None => json!({ "x": lm.x, "y": lm.y, "z": lm.z }),
        })
        .collect()
}

pub fn frame(landmarks: Vec<Value>) -> Value {
    json!({ "landmarks": landmarks })
}
