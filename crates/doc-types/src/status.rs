use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-property status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PropertyStatus: u32 {
        /// Not shown in editors.
        const HIDDEN = 1 << 0;
        /// Rejects edits from editors; programmatic setters still work.
        const READ_ONLY = 1 << 1;
        /// Never written on save.
        const TRANSIENT = 1 << 2;
        /// Changes do not touch the owning object.
        const OUTPUT = 1 << 3;
        /// Changes do not trigger a recompute of the owning object.
        const NO_RECOMPUTE = 1 << 4;
    }
}

impl PropertyStatus {
    /// Whether a change to a property with this status marks its object for recompute.
    pub fn touches_container(self) -> bool {
        !self.intersects(PropertyStatus::OUTPUT | PropertyStatus::NO_RECOMPUTE)
    }

    /// Bits that survive a save/restore cycle.
    pub fn persistent(self) -> PropertyStatus {
        self - PropertyStatus::TRANSIENT
    }
}
