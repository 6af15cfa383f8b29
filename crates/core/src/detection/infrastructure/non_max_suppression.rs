use crate::detection::domain::raw_predictions::RawPredictions;
use crate::geometry::scaling::xywh_to_xyxy;
use crate::shared::bounding_box::Detection;

/// Thresholds for [`non_max_suppression`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsSettings {
    /// Candidates must score strictly above this.
    pub confidence: f32,
    /// Same-class boxes overlapping a kept box by more than this are dropped.
    pub iou: f32,
    pub max_detections: usize,
}

/// YOLO-style greedy suppression, per batch entry.
///
/// A candidate's score is `objectness * best class score`. Survivors are
/// sorted by score descending; boxes only suppress boxes of their own class.
pub fn non_max_suppression(raw: &RawPredictions, settings: &NmsSettings) -> Vec<Vec<Detection>> {
    let num_classes = raw.num_classes();
    (0..raw.batch_size())
        .map(|batch| {
            let mut candidates: Vec<Detection> = raw
                .rows(batch)
                .filter_map(|row| {
                    let objectness = row[4];
                    if objectness <= settings.confidence {
                        return None;
                    }
                    let (class_id, class_score) = if num_classes == 0 {
                        (0, 1.0)
                    } else {
                        row.iter()
                            .skip(5)
                            .copied()
                            .enumerate()
                            .fold((0, f32::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best })
                    };
                    let confidence = objectness * class_score;
                    if confidence <= settings.confidence {
                        return None;
                    }
                    Some(Detection {
                        bbox: xywh_to_xyxy([row[0], row[1], row[2], row[3]]),
                        confidence,
                        class_id,
                    })
                })
                .collect();
            greedy_suppress(&mut candidates, settings.iou, settings.max_detections)
        })
        .collect()
}

fn greedy_suppress(dets: &mut [Detection], iou_thresh: f32, max_detections: usize) -> Vec<Detection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        if keep.len() == max_detections {
            break;
        }
        for j in (i + 1)..dets.len() {
            if suppressed[j] || dets[j].class_id != dets[i].class_id {
                continue;
            }
            if bbox_iou(&dets[i].bbox, &dets[j].bbox) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

/// IoU between two `[x1, y1, x2, y2]` boxes.
pub fn bbox_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}
