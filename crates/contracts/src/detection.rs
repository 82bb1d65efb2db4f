//! Neural network detections and their bus representation.

use serde::{Deserialize, Serialize};

use crate::{Header, MonotonicTime, TimestampSource};

/// Single detection reported by the device (normalised image coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImgDetection {
    pub label: u32,
    pub confidence: f32,
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

/// Detections produced for one input frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImgDetections {
    pub detections: Vec<ImgDetection>,
    pub timestamp: MonotonicTime,
    pub timestamp_device: MonotonicTime,
    pub sequence: u64,
}

impl ImgDetections {
    /// Timestamp in the selected clock domain.
    pub fn stamp(&self, source: TimestampSource) -> MonotonicTime {
        match source {
            TimestampSource::Host => self.timestamp,
            TimestampSource::Device => self.timestamp_device,
        }
    }
}

/// Class hypothesis for a detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectHypothesis {
    pub id: String,
    pub score: f64,
}

/// Axis-aligned box given by centre and size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    pub center_x: f64,
    pub center_y: f64,
    pub size_x: f64,
    pub size_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection2D {
    pub header: Header,
    pub results: Vec<ObjectHypothesis>,
    pub bbox: BoundingBox2D,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection2DArray {
    pub header: Header,
    pub detections: Vec<Detection2D>,
}
