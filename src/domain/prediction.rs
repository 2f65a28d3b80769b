// ============================================================
// Layer 3 — PredictionRecord Domain Type
// ============================================================
// One model prediction for one source sample.
//
//   data_index  → position in the ResultStore's sample list
//   cam         → weak-perspective camera [scale, tx, ty]
//   smpl_shape  → body-shape coefficients
//   smpl_pose   → body-pose (axis-angle per joint)
//   pred_verts  → predicted mesh vertices, stored as f16
//
// A record is built once from a batch slice and never mutated.

use half::f16;
use serde::{Deserialize, Serialize};

/// Width of the weak-perspective camera vector.
pub const CAM_DIM: usize = 3;

/// Number of body-shape coefficients.
pub const SHAPE_DIM: usize = 10;

/// Number of body-pose parameters (24 joints x 3 axis-angle).
pub const POSE_DIM: usize = 72;

/// A single prediction, keyed by its index into the sample list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub data_index: usize,
    pub cam:        Vec<f32>,
    pub smpl_shape: Vec<f32>,
    pub smpl_pose:  Vec<f32>,

    /// Vertices narrowed to half precision to bound memory.
    #[serde(with = "f16_vertices")]
    pub pred_verts: Vec<[f16; 3]>,
}

impl PredictionRecord {
    /// Build a record, narrowing full-precision vertices to f16.
    pub fn new(
        data_index: usize,
        cam:        &[f32],
        smpl_shape: &[f32],
        smpl_pose:  &[f32],
        verts:      &[[f32; 3]],
    ) -> Self {
        Self {
            data_index,
            cam:        cam.to_vec(),
            smpl_shape: smpl_shape.to_vec(),
            smpl_pose:  smpl_pose.to_vec(),
            pred_verts: verts
                .iter()
                .map(|v| [f16::from_f32(v[0]), f16::from_f32(v[1]), f16::from_f32(v[2])])
                .collect(),
        }
    }

    /// Vertices widened back to f32 for projection.
    pub fn vertices_f32(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.pred_verts
            .iter()
            .map(|v| [v[0].to_f32(), v[1].to_f32(), v[2].to_f32()])
    }
}

/// Model outputs for one batch, row-aligned with the batch indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutputs {
    pub cams:         Vec<Vec<f32>>,
    pub shape_params: Vec<Vec<f32>>,
    pub pose_params:  Vec<Vec<f32>>,
    pub pred_verts:   Vec<Vec<[f32; 3]>>,
}

// f16 has no stable std serde story; persist the raw bit patterns.
mod f16_vertices {
    use half::f16;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(verts: &[[f16; 3]], s: S) -> Result<S::Ok, S::Error> {
        let bits: Vec<[u16; 3]> = verts
            .iter()
            .map(|v| [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()])
            .collect();
        bits.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<[f16; 3]>, D::Error> {
        let bits = Vec::<[u16; 3]>::deserialize(d)?;
        Ok(bits
            .into_iter()
            .map(|b| [f16::from_bits(b[0]), f16::from_bits(b[1]), f16::from_bits(b[2])])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_are_narrowed() {
        let rec = PredictionRecord::new(0, &[1.0; 3], &[0.0; 10], &[0.0; 72], &[[0.1, 0.5, -2.0]]);
        let v   = rec.vertices_f32().next().unwrap();
        // 0.5 and -2.0 are exact in f16, 0.1 is not
        assert_eq!(v[1], 0.5);
        assert_eq!(v[2], -2.0);
        assert_ne!(v[0], 0.1);
        assert!((v[0] - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_narrowing_is_deterministic() {
        let verts = [[0.123_456_f32, 7.654_321, -0.000_1]];
        let a = PredictionRecord::new(4, &[0.0; 3], &[0.0; 10], &[0.0; 72], &verts);
        let b = PredictionRecord::new(4, &[0.0; 3], &[0.0; 10], &[0.0; 72], &verts);
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_keeps_vertex_bits() {
        let rec  = PredictionRecord::new(2, &[0.9, 0.1, -0.1], &[0.0; 10], &[0.0; 72], &[[0.3, 0.2, 0.1]]);
        let json = serde_json::to_string(&rec).unwrap();
        let back: PredictionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
