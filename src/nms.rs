use ndarray::Array2;

use crate::detection::Detection;

/// How overlapping detections inside one frame are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NmsMode {
    /// Single forward pass over confidence-ascending pairs: a detection is
    /// dropped when any higher-confidence detection overlaps it, even if
    /// that detection is itself dropped by a later pair. Transitive overlap
    /// chains over-prune under this mode; the behavior is intentional and
    /// must not be "fixed" here.
    PairwiseForward,
    /// Canonical greedy NMS: sort descending by confidence, suppress later
    /// boxes overlapping a kept box.
    Greedy,
}

/// Removes near-duplicate detections of one frame. Survivors keep their
/// original input order.
pub fn suppress(dets: &[Detection], overlap_threshold: f32, mode: NmsMode) -> Vec<Detection> {
    if dets.len() < 2 {
        return dets.to_vec();
    }

    match mode {
        NmsMode::PairwiseForward => pairwise_forward(dets, overlap_threshold),
        NmsMode::Greedy => greedy(dets, overlap_threshold),
    }
}

fn iou_matrix(dets: &[Detection], order: &[usize]) -> Array2<f32> {
    Array2::from_shape_fn((order.len(), order.len()), |(i, j)| {
        dets[order[i]].iou(&dets[order[j]])
    })
}

fn pairwise_forward(dets: &[Detection], overlap_threshold: f32) -> Vec<Detection> {
    let mut order: Vec<usize> = (0..dets.len()).collect();
    order.sort_by(|&a, &b| dets[a].confidence.total_cmp(&dets[b].confidence));

    let iou = iou_matrix(dets, &order);
    let mut removed = vec![false; dets.len()];

    for i in 0..order.len() {
        for j in i + 1..order.len() {
            if iou[(i, j)] > overlap_threshold {
                removed[order[i]] = true;
                break;
            }
        }
    }

    dets.iter()
        .zip(&removed)
        .filter(|(_, &removed)| !removed)
        .map(|(det, _)| det.clone())
        .collect()
}

fn greedy(dets: &[Detection], overlap_threshold: f32) -> Vec<Detection> {
    let mut order: Vec<usize> = (0..dets.len()).collect();
    order.sort_by(|&a, &b| dets[b].confidence.total_cmp(&dets[a].confidence));

    let mut retain: Vec<i32> = order.iter().map(|&i| i as i32).collect();
    for idx in 0..retain.len() - 1 {
        if retain[idx] != -1 {
            let kept = &dets[retain[idx] as usize];
            for r in retain[idx + 1..].iter_mut() {
                if *r != -1 && kept.iou(&dets[*r as usize]) > overlap_threshold {
                    *r = -1;
                }
            }
        }
    }

    let mut keep: Vec<usize> = retain
        .into_iter()
        .filter(|&i| i != -1)
        .map(|i| i as usize)
        .collect();
    keep.sort_unstable();

    keep.into_iter().map(|i| dets[i].clone()).collect()
}
