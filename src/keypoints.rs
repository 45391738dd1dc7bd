use crate::pose::{Keypoint, KeypointKind, Pose, NUM_KEYPOINTS};

/// Confidently observed keypoints of a single frame, one slot per joint.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct IndexedKeypoints {
    slots: [Option<Keypoint>; NUM_KEYPOINTS],
}

impl IndexedKeypoints {
    /// Keep every keypoint whose confidence is strictly above `threshold`.
    ///
    /// Duplicated joints overwrite each other in order, so the last one wins.
    pub(crate) fn index(pose: Option<&Pose>, threshold: f32) -> Self {
        let mut slots = [None; NUM_KEYPOINTS];
        pose.into_iter()
            .flat_map(|pose| pose.keypoints.iter())
            .filter(|keypoint| keypoint.confidence() > threshold)
            .for_each(|&keypoint| slots[keypoint.kind.idx()] = Some(keypoint));
        Self { slots }
    }

    #[inline]
    pub(crate) fn get(&self, kind: KeypointKind) -> Option<&Keypoint> {
        self.slots[kind.idx()].as_ref()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether every canonical joint was observed.
    pub(crate) fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Keypoint> + '_ {
        self.slots.iter().flatten()
    }
}
