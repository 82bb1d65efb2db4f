//! Detection batch to `Detection2DArray` conversion.

use std::collections::VecDeque;

use contracts::{
    BoundingBox2D, ContractError, Detection2D, Detection2DArray, DetectionConverterConfig, Header,
    ImgDetection, ImgDetections, ObjectHypothesis, RebaseEvent, TimeBaseConfig,
};
use time_base::{ClockSource, SystemClock, TimeBase};
use tracing::instrument;
use validator::Validate;

const CONVERTER_NAME: &str = "detection";

/// Converts device detections into bounding box arrays.
#[derive(Debug)]
pub struct DetectionConverter<C = SystemClock> {
    config: DetectionConverterConfig,
    time_base: TimeBase<C>,
    sequence: u64,
}

impl DetectionConverter<SystemClock> {
    /// # Errors
    /// Returns a validation error if the configuration is invalid
    pub fn new(
        config: DetectionConverterConfig,
        time_base: &TimeBaseConfig,
    ) -> Result<Self, ContractError> {
        Self::with_clock(config, time_base, SystemClock)
    }
}

impl<C: ClockSource> DetectionConverter<C> {
    /// # Errors
    /// Returns a validation error if the configuration is invalid
    pub fn with_clock(
        config: DetectionConverterConfig,
        time_base: &TimeBaseConfig,
        clock: C,
    ) -> Result<Self, ContractError> {
        config
            .validate()
            .map_err(|e| ContractError::from_validation("detection", &e))?;

        Ok(Self {
            time_base: TimeBase::with_clock(clock, time_base),
            config,
            sequence: 0,
        })
    }

    /// Convert one detection batch and append it to `out`
    #[instrument(
        name = "detection_converter_to_records",
        level = "debug",
        skip(self, input, out),
        fields(detections = input.detections.len())
    )]
    pub fn to_records(&mut self, input: &ImgDetections, out: &mut VecDeque<Detection2DArray>) {
        out.push_back(self.convert(input));
        observability::record_records_emitted(CONVERTER_NAME, 1);
    }

    /// Convert one detection batch
    pub fn to_record(&mut self, input: &ImgDetections) -> Box<Detection2DArray> {
        observability::record_records_emitted(CONVERTER_NAME, 1);
        Box::new(self.convert(input))
    }

    fn convert(&mut self, input: &ImgDetections) -> Detection2DArray {
        let header = Header {
            frame_id: self.config.frame_id.clone(),
            stamp: self
                .time_base
                .translate(input.stamp(self.config.timestamp_source)),
            seq: self.sequence,
        };
        self.sequence += 1;

        let detections = input
            .detections
            .iter()
            .map(|det| Detection2D {
                header: header.clone(),
                results: vec![ObjectHypothesis {
                    id: det.label.to_string(),
                    score: f64::from(det.confidence),
                }],
                bbox: self.bounding_box(det),
            })
            .collect();

        Detection2DArray { header, detections }
    }

    fn bounding_box(&self, det: &ImgDetection) -> BoundingBox2D {
        let (scale_x, scale_y) = if self.config.normalized {
            (1.0, 1.0)
        } else {
            (f64::from(self.config.width), f64::from(self.config.height))
        };

        let x_min = f64::from(det.xmin) * scale_x;
        let y_min = f64::from(det.ymin) * scale_y;
        let size_x = f64::from(det.xmax) * scale_x - x_min;
        let size_y = f64::from(det.ymax) * scale_y - y_min;

        BoundingBox2D {
            center_x: x_min + size_x / 2.0,
            center_y: y_min + size_y / 2.0,
            size_x,
            size_y,
        }
    }

    /// Absorb a reference clock discontinuity
    pub fn rebase(&mut self) -> RebaseEvent {
        self.time_base.rebase()
    }

    pub fn time_base(&self) -> &TimeBase<C> {
        &self.time_base
    }
}
